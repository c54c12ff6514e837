use axum::{extract::State, response::Html};
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::invoicing::error::InvoicingError;
use crate::invoicing::storage::list_tenant_products;
use crate::invoicing::ui;
use crate::shared::state::AppState;
use crate::web::auth::AuthenticatedUser;

use super::{render, tenant, with_conn};

pub async fn handle_products_page(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
) -> Result<Html<String>, InvoicingError> {
    let company_id = tenant(&user)?;
    let rows = with_conn(&state, move |conn| Ok(list_tenant_products(conn, company_id)?)).await?;
    Ok(render(&user, &cookies, "Products", &ui::products_page(&rows)))
}
