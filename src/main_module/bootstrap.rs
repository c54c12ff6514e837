//! First-run setup: admin account, default company and owner role.

use anyhow::{Context, Result};
use diesel::prelude::*;
use log::{info, warn};

use crate::core::config::AppConfig;
use crate::core::shared::utils::{create_conn, run_migrations};
use crate::security::{check_password, hash_password};
use crate::tenancy::{
    find_user_by_login, first_superuser, get_or_create_company, get_or_create_role, insert_user,
    CompanyDefaults, CompanyRole, DbCompany, DbUser,
};

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "Admin@123456";
pub const DEFAULT_COMPANY_NAME: &str = "Default Company";

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub admin_email: String,
    pub admin_password: String,
    pub company_name: String,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
            company_name: DEFAULT_COMPANY_NAME.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct InitReport {
    pub user: DbUser,
    pub user_created: bool,
    pub company: DbCompany,
    pub company_created: bool,
    pub role_created: bool,
}

impl InitReport {
    pub fn summary(&self) -> String {
        let state = |created: bool| if created { "created" } else { "exists" };
        format!(
            "admin user {} ({})\ncompany {} ({})\nowner role ({})",
            self.user.email,
            state(self.user_created),
            self.company.name,
            state(self.company_created),
            state(self.role_created),
        )
    }
}

/// Username derived from the local part of an email address.
pub fn username_for(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or(email)
        .to_string()
}

/// Bootstrap companies get the top plan, active from the start.
pub fn company_defaults(owner_email: &str) -> CompanyDefaults {
    CompanyDefaults {
        email: Some(owner_email.to_string()),
        subscription_plan: "ENTERPRISE".to_string(),
        subscription_status: "ACTIVE".to_string(),
        ..CompanyDefaults::default()
    }
}

/// Runs pending migrations, then creates whatever of the admin, company and
/// role is missing. Safe to run repeatedly.
pub fn run_init(config: &AppConfig, options: &InitOptions) -> Result<InitReport> {
    let pool = create_conn(&config.database_url).context("Failed to create database pool")?;
    run_migrations(&pool)?;

    let mut conn = pool.get().context("Failed to get database connection")?;
    let report = bootstrap_tenant(&mut conn, options)?;

    info!(
        "Bootstrap finished: user_created={} company_created={} role_created={}",
        report.user_created, report.company_created, report.role_created
    );
    Ok(report)
}

pub fn bootstrap_tenant(conn: &mut PgConnection, options: &InitOptions) -> Result<InitReport> {
    for issue in check_password(&options.admin_password) {
        warn!("Admin password is weak: {}", issue.message());
    }

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let existing = match find_user_by_login(conn, &options.admin_email)? {
            Some(user) => Some(user),
            None => first_superuser(conn)?,
        };

        let (user, user_created) = match existing {
            Some(user) => {
                info!("Admin user {} already exists", user.email);
                (user, false)
            }
            None => {
                let hash = hash_password(&options.admin_password)?;
                let user = insert_user(
                    conn,
                    &username_for(&options.admin_email),
                    &options.admin_email,
                    hash,
                    true,
                )?;
                info!("Created admin user {}", user.email);
                (user, true)
            }
        };

        let (company, company_created) = get_or_create_company(
            conn,
            user.id,
            &options.company_name,
            company_defaults(&user.email),
        )?;
        let (_, role_created) = get_or_create_role(conn, user.id, company.id, CompanyRole::Owner)?;

        Ok(InitReport {
            user,
            user_created,
            company,
            company_created,
            role_created,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_for() {
        assert_eq!(username_for("admin@example.com"), "admin");
        assert_eq!(username_for("@example.com"), "@example.com");
        assert_eq!(username_for("plain"), "plain");
    }

    #[test]
    fn test_company_defaults_use_uppercase_codes() {
        let defaults = company_defaults("admin@example.com");
        assert_eq!(defaults.subscription_plan, "ENTERPRISE");
        assert_eq!(defaults.subscription_status, "ACTIVE");
        assert_eq!(defaults.email.as_deref(), Some("admin@example.com"));
        assert_eq!(defaults.country, None);
    }

    #[test]
    fn test_default_options() {
        let options = InitOptions::default();
        assert_eq!(options.admin_email, DEFAULT_ADMIN_EMAIL);
        assert!(check_password(&options.admin_password).is_empty());
    }
}
