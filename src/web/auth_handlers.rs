//! Authentication handlers for login, logout and the public landing page

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::{error, info, warn};

use crate::security::verify_password;
use crate::shared::state::AppState;
use crate::tenancy::{find_user_by_login, primary_company_for_user, DbUser};

use super::auth::{create_auth_cookie, removal_cookie, AuthenticatedUser, OptionalAuth};
use super::flash::{flash_error, flash_success, take_flash};
use super::layout::page;

/// Login form data. `username` accepts a username or an email address.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub async fn landing_page(OptionalAuth(auth): OptionalAuth, cookies: Cookies) -> Html<String> {
    let flash = take_flash(&cookies);
    let action = if auth.is_some() {
        r#"<a class="btn btn-primary" href="/dashboard">Go to dashboard</a>"#
    } else {
        r#"<a class="btn btn-primary" href="/login">Log in</a>"#
    };
    let body = format!(
        r#"<div class="card">
            <h2>Invoicing</h2>
            <p style="margin-bottom: 16px">Manage clients, build invoices and send them as PDF documents.</p>
            {action}
        </div>"#
    );
    page(
        "Invoicing",
        auth.as_ref().map(AuthenticatedUser::display_name),
        flash.as_ref(),
        &body,
    )
}

/// Show login page; signed-in users go straight to the dashboard.
pub async fn login_page(OptionalAuth(auth): OptionalAuth, cookies: Cookies) -> Response {
    if auth.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    let flash = take_flash(&cookies);
    let body = r#"<div class="card" style="max-width: 420px; margin: 40px auto">
            <h2>Log in</h2>
            <form class="stacked" method="post" action="/login">
                <label for="username">Username or email</label>
                <input id="username" name="username" type="text" required autofocus>
                <label for="password">Password</label>
                <input id="password" name="password" type="password" required>
                <button class="btn btn-primary" type="submit">Log in</button>
            </form>
        </div>"#;
    page("Log in", None, flash.as_ref(), body).into_response()
}

enum LoginOutcome {
    Success(DbUser, Option<uuid::Uuid>),
    Rejected,
}

/// Handle login form submission
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    OptionalAuth(auth): OptionalAuth,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    if auth.is_some() {
        return Redirect::to("/dashboard").into_response();
    }

    let pool = state.conn.clone();
    let login = form.username.trim().to_string();
    let password = form.password;

    let outcome = tokio::task::spawn_blocking(move || -> anyhow::Result<LoginOutcome> {
        let mut conn = pool.get()?;
        let Some(user) = find_user_by_login(&mut conn, &login)? else {
            return Ok(LoginOutcome::Rejected);
        };
        if !verify_password(&password, &user.password_hash)? {
            return Ok(LoginOutcome::Rejected);
        }
        let company = primary_company_for_user(&mut conn, user.id)?;
        Ok(LoginOutcome::Success(user, company))
    })
    .await;

    match outcome {
        Ok(Ok(LoginOutcome::Success(user, company))) => {
            if company.is_none() {
                warn!("User {} has no company membership", user.username);
            }
            match state.auth_config.issue_token(&user, company) {
                Ok(token) => {
                    cookies.add(create_auth_cookie(
                        &token,
                        state.auth_config.session_expiry_hours,
                    ));
                    info!("User {} logged in", user.username);
                    flash_success(&cookies, format!("Welcome back, {}", user.username));
                    Redirect::to("/dashboard").into_response()
                }
                Err(e) => {
                    error!("Failed to sign session token: {e}");
                    flash_error(&cookies, "Something went wrong");
                    Redirect::to("/login").into_response()
                }
            }
        }
        Ok(Ok(LoginOutcome::Rejected)) => {
            flash_error(&cookies, "Invalid Credentials");
            Redirect::to("/login").into_response()
        }
        Ok(Err(e)) => {
            error!("Login failed: {e}");
            flash_error(&cookies, "Invalid Credentials");
            Redirect::to("/login").into_response()
        }
        Err(e) => {
            error!("Login task panicked: {e}");
            flash_error(&cookies, "Something went wrong");
            Redirect::to("/login").into_response()
        }
    }
}

pub async fn logout(user: AuthenticatedUser, cookies: Cookies) -> Redirect {
    cookies.remove(removal_cookie());
    info!("User {} logged out", user.claims.name);
    flash_success(&cookies, "You have been logged out");
    Redirect::to("/login")
}
