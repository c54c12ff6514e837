use axum::{extract::State, response::Html};
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::invoicing::error::InvoicingError;
use crate::invoicing::storage::{count_clients, count_invoices};
use crate::invoicing::types::InvoiceStatus;
use crate::invoicing::ui;
use crate::shared::state::AppState;
use crate::web::auth::AuthenticatedUser;

use super::{render, tenant, with_conn};

pub async fn handle_dashboard(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
) -> Result<Html<String>, InvoicingError> {
    let company_id = tenant(&user)?;

    let (clients, invoices, paid) = with_conn(&state, move |conn| {
        Ok((
            count_clients(conn, company_id)?,
            count_invoices(conn, company_id, None)?,
            count_invoices(conn, company_id, Some(InvoiceStatus::Paid))?,
        ))
    })
    .await?;

    Ok(render(
        &user,
        &cookies,
        "Dashboard",
        &ui::dashboard(clients, invoices, paid),
    ))
}
