use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::PgConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::schema::{companies, company_user_roles, users};
use crate::core::shared::utils::{build_slug, unique_suffix};

use super::CompanyRole;

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = users)]
pub struct DbUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Insertable, AsChangeset, Serialize, Deserialize)]
#[diesel(table_name = companies)]
pub struct DbCompany {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub tax_number: Option<String>,
    pub subscription_plan: String,
    pub subscription_status: String,
    pub is_active: bool,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Insertable, Serialize, Deserialize)]
#[diesel(table_name = company_user_roles)]
pub struct DbCompanyUserRole {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Values used only when a company row has to be created.
#[derive(Debug, Clone, Default)]
pub struct CompanyDefaults {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub country: Option<String>,
    pub tax_number: Option<String>,
    pub subscription_plan: String,
    pub subscription_status: String,
}

pub fn find_user_by_login(conn: &mut PgConnection, login: &str) -> QueryResult<Option<DbUser>> {
    users::table
        .filter(users::username.eq(login).or(users::email.eq(login)))
        .order(users::created_at.asc())
        .first(conn)
        .optional()
}

pub fn first_superuser(conn: &mut PgConnection) -> QueryResult<Option<DbUser>> {
    users::table
        .filter(users::is_superuser.eq(true))
        .order(users::created_at.asc())
        .first(conn)
        .optional()
}

pub fn insert_user(
    conn: &mut PgConnection,
    username: &str,
    email: &str,
    password_hash: String,
    is_superuser: bool,
) -> QueryResult<DbUser> {
    let now = Utc::now();
    let user = DbUser {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash,
        is_superuser,
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(users::table)
        .values(&user)
        .execute(conn)?;

    Ok(user)
}

/// Returns the company and whether it was created by this call.
pub fn get_or_create_company(
    conn: &mut PgConnection,
    owner_id: Uuid,
    name: &str,
    defaults: CompanyDefaults,
) -> QueryResult<(DbCompany, bool)> {
    let existing: Option<DbCompany> = companies::table
        .filter(companies::owner_id.eq(owner_id))
        .filter(companies::name.eq(name))
        .first(conn)
        .optional()?;

    if let Some(company) = existing {
        return Ok((company, false));
    }

    let now = Utc::now();
    let company = DbCompany {
        id: Uuid::new_v4(),
        owner_id,
        name: name.to_string(),
        email: defaults.email,
        phone: defaults.phone,
        website: defaults.website,
        description: defaults.description,
        country: defaults.country,
        tax_number: defaults.tax_number,
        subscription_plan: defaults.subscription_plan,
        subscription_status: defaults.subscription_status,
        is_active: true,
        slug: build_slug(Some(name), &unique_suffix()),
        created_at: now,
        updated_at: now,
    };

    diesel::insert_into(companies::table)
        .values(&company)
        .execute(conn)?;

    Ok((company, true))
}

/// Returns the role row and whether it was created by this call.
pub fn get_or_create_role(
    conn: &mut PgConnection,
    user_id: Uuid,
    company_id: Uuid,
    role: CompanyRole,
) -> QueryResult<(DbCompanyUserRole, bool)> {
    let existing: Option<DbCompanyUserRole> = company_user_roles::table
        .filter(company_user_roles::user_id.eq(user_id))
        .filter(company_user_roles::company_id.eq(company_id))
        .first(conn)
        .optional()?;

    if let Some(row) = existing {
        return Ok((row, false));
    }

    let row = DbCompanyUserRole {
        id: Uuid::new_v4(),
        user_id,
        company_id,
        role: role.to_string(),
        created_at: Utc::now(),
    };

    diesel::insert_into(company_user_roles::table)
        .values(&row)
        .execute(conn)?;

    Ok((row, true))
}

/// The tenant a user works in: their oldest company membership.
pub fn primary_company_for_user(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> QueryResult<Option<Uuid>> {
    company_user_roles::table
        .inner_join(companies::table)
        .filter(company_user_roles::user_id.eq(user_id))
        .filter(companies::is_active.eq(true))
        .order(company_user_roles::created_at.asc())
        .select(company_user_roles::company_id)
        .first(conn)
        .optional()
}
