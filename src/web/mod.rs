//! Session authentication, flash messages and the shared HTML shell.

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::shared::state::AppState;

pub mod auth;
pub mod auth_handlers;
pub mod flash;
pub mod layout;

pub use auth::{AuthConfig, AuthenticatedUser, OptionalAuth};

pub fn configure_auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(auth_handlers::landing_page))
        .route(
            "/login",
            get(auth_handlers::login_page).post(auth_handlers::login_submit),
        )
        .route("/logout", get(auth_handlers::logout))
}
