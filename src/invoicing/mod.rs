pub mod error;
pub mod forms;
pub mod handlers;
pub mod storage;
pub mod totals;
pub mod types;
pub mod ui;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::shared::state::AppState;

pub use error::InvoicingError;
pub use handlers::*;
pub use types::*;

pub fn configure_invoicing_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(handle_dashboard))
        .route("/clients", get(handle_clients_page).post(handle_create_client))
        .route(
            "/clients/:slug/edit",
            get(handle_edit_client_page).post(handle_update_client),
        )
        .route("/clients/:slug/delete", post(handle_delete_client))
        .route("/invoices", get(handle_invoices_page))
        .route("/products", get(handle_products_page))
        .route("/invoices/create", get(handle_create_invoice))
        .route("/invoices/create-build/:slug", get(handle_build_invoice_page))
        .route("/invoices/create-build/:slug/products", post(handle_add_product))
        .route("/invoices/create-build/:slug/details", post(handle_update_details))
        .route("/invoices/create-build/:slug/client", post(handle_attach_client))
        .route("/invoices/view-pdf/:slug", get(handle_view_invoice))
        .route("/invoices/view-document/:slug", get(handle_download_pdf))
        .route("/invoices/email-document/:slug", get(handle_email_pdf))
        .route(
            "/invoices/delete/:slug",
            get(handle_delete_invoice_page).post(handle_delete_invoice),
        )
        .route("/company/settings", get(handle_settings_page))
        .route(
            "/company/settings/edit",
            get(handle_settings_edit_page).post(handle_save_settings),
        )
        .route("/company/settings/bank-accounts", post(handle_add_bank_account))
}
