pub mod clients;
pub mod dashboard;
pub mod documents;
pub mod invoices;
pub mod products;
pub mod settings;

pub use clients::*;
pub use dashboard::*;
pub use documents::*;
pub use invoices::*;
pub use products::*;
pub use settings::*;

use axum::response::{Html, IntoResponse, Redirect, Response};
use diesel::PgConnection;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::shared::state::AppState;
use crate::web::auth::AuthenticatedUser;
use crate::web::flash::{flash_error, take_flash};
use crate::web::layout::page;

use super::error::InvoicingError;

pub(crate) fn tenant(user: &AuthenticatedUser) -> Result<Uuid, InvoicingError> {
    user.company_id().ok_or(InvoicingError::NoTenant)
}

/// Run diesel work on a pooled connection off the async runtime.
pub(crate) async fn with_conn<T, F>(state: &AppState, f: F) -> Result<T, InvoicingError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, InvoicingError> + Send + 'static,
    T: Send + 'static,
{
    let pool = state.conn.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool
            .get()
            .map_err(|e| InvoicingError::Database(e.to_string()))?;
        f(&mut conn)
    })
    .await
    .map_err(|e: tokio::task::JoinError| InvoicingError::Internal(e.to_string()))?
}

pub(crate) fn render(
    user: &AuthenticatedUser,
    cookies: &Cookies,
    title: &str,
    body: &str,
) -> Html<String> {
    let flash = take_flash(cookies);
    page(title, Some(user.display_name()), flash.as_ref(), body)
}

/// Flash the error for the user and send them to `to`.
pub(crate) fn redirect_with_error(cookies: &Cookies, err: &InvoicingError, to: &str) -> Response {
    match err {
        InvoicingError::Database(_) | InvoicingError::Internal(_) => {
            log::error!("{err}");
        }
        other => log::warn!("{other}"),
    }
    flash_error(cookies, err.user_message());
    Redirect::to(to).into_response()
}
