use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use chrono::Utc;
use diesel::OptionalExtension;
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::invoicing::error::InvoicingError;
use crate::invoicing::forms::{ClientSelectForm, InvoiceDetailsForm, ProductForm};
use crate::invoicing::storage::{
    attach_client, create_blank_invoice, delete_invoice, find_client_by_slug,
    find_invoice_by_slug, insert_product, list_clients, list_invoice_summaries,
    products_for_invoice, update_invoice_details, DbInvoice,
};
use crate::invoicing::ui;
use crate::shared::state::AppState;
use crate::web::auth::AuthenticatedUser;
use crate::web::flash::{flash_error, flash_success};

use super::{redirect_with_error, render, tenant, with_conn};

fn build_url(slug: &str) -> String {
    format!("/invoices/create-build/{slug}")
}

fn require_invoice(
    conn: &mut diesel::PgConnection,
    company_id: uuid::Uuid,
    slug: &str,
) -> Result<DbInvoice, InvoicingError> {
    find_invoice_by_slug(conn, company_id, slug)
        .optional()?
        .ok_or_else(|| InvoicingError::NotFound(format!("Invoice {slug}")))
}

pub async fn handle_invoices_page(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
) -> Result<Html<String>, InvoicingError> {
    let company_id = tenant(&user)?;
    let summaries =
        with_conn(&state, move |conn| Ok(list_invoice_summaries(conn, company_id)?)).await?;
    Ok(render(
        &user,
        &cookies,
        "Invoices",
        &ui::invoices_page(&summaries),
    ))
}

/// Creates a blank invoice and opens its build page.
pub async fn handle_create_invoice(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<Redirect, InvoicingError> {
    let company_id = tenant(&user)?;
    let invoice = with_conn(&state, move |conn| Ok(create_blank_invoice(conn, company_id)?)).await?;
    log::info!("Created invoice {} ({})", invoice.number, invoice.slug);
    Ok(Redirect::to(&build_url(&invoice.slug)))
}

pub async fn handle_build_invoice_page(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
) -> Result<Html<String>, InvoicingError> {
    let company_id = tenant(&user)?;

    let (invoice, products, clients) = with_conn(&state, move |conn| {
        let invoice = require_invoice(conn, company_id, &slug)?;
        let products = products_for_invoice(conn, invoice.id)?;
        let clients = list_clients(conn, company_id)?;
        Ok((invoice, products, clients))
    })
    .await?;

    let current = invoice
        .client_id
        .and_then(|id| clients.iter().find(|c| c.id == id));
    let body = ui::build_invoice_page(&invoice, &products, &clients, current);
    Ok(render(&user, &cookies, &invoice.number, &body))
}

pub async fn handle_add_product(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
    Form(form): Form<ProductForm>,
) -> Result<Response, InvoicingError> {
    let company_id = tenant(&user)?;
    let back = build_url(&slug);

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return Ok(redirect_with_error(&cookies, &e, &back)),
    };

    with_conn(&state, move |conn| {
        let invoice = require_invoice(conn, company_id, &slug)?;
        insert_product(conn, invoice.id, input)?;
        Ok(())
    })
    .await?;

    flash_success(&cookies, "Invoice product added successfully");
    Ok(Redirect::to(&back).into_response())
}

pub async fn handle_update_details(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
    Form(form): Form<InvoiceDetailsForm>,
) -> Result<Response, InvoicingError> {
    let company_id = tenant(&user)?;
    let back = build_url(&slug);

    let details = match form.validate(Utc::now().date_naive()) {
        Ok(details) => details,
        Err(e) => return Ok(redirect_with_error(&cookies, &e, &back)),
    };

    with_conn(&state, move |conn| {
        let invoice = require_invoice(conn, company_id, &slug)?;
        update_invoice_details(conn, &invoice, details)?;
        Ok(())
    })
    .await?;

    flash_success(&cookies, "Invoice updated successfully");
    Ok(Redirect::to(&back).into_response())
}

pub async fn handle_attach_client(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
    Form(form): Form<ClientSelectForm>,
) -> Result<Response, InvoicingError> {
    let company_id = tenant(&user)?;
    let back = build_url(&slug);

    let client_slug = match form.validate() {
        Ok(client_slug) => client_slug,
        Err(e) => return Ok(redirect_with_error(&cookies, &e, &back)),
    };

    let result = with_conn(&state, move |conn| {
        let invoice = require_invoice(conn, company_id, &slug)?;
        let client = find_client_by_slug(conn, company_id, &client_slug)
            .optional()?
            .ok_or_else(|| InvoicingError::Validation("Select a valid client".to_string()))?;
        attach_client(conn, &invoice, &client)?;
        Ok(())
    })
    .await;

    match result {
        Ok(()) => {
            flash_success(&cookies, "Client added to invoice successfully");
            Ok(Redirect::to(&back).into_response())
        }
        Err(e @ InvoicingError::Validation(_)) => Ok(redirect_with_error(&cookies, &e, &back)),
        Err(e) => Err(e),
    }
}

pub async fn handle_delete_invoice_page(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
) -> Response {
    let company_id = match tenant(&user) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match with_conn(&state, move |conn| require_invoice(conn, company_id, &slug)).await {
        Ok(invoice) => render(
            &user,
            &cookies,
            "Delete invoice",
            &ui::delete_invoice_page(&invoice),
        )
        .into_response(),
        Err(e) => {
            log::warn!("Invoice delete failed: {e}");
            flash_error(&cookies, "Something went wrong");
            Redirect::to("/invoices").into_response()
        }
    }
}

pub async fn handle_delete_invoice(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
) -> Response {
    let company_id = match tenant(&user) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    let result = with_conn(&state, move |conn| {
        delete_invoice(conn, company_id, &slug)?;
        Ok(slug)
    })
    .await;

    match result {
        Ok(slug) => {
            log::info!("Deleted invoice {slug}");
            flash_success(&cookies, "Invoice deleted");
        }
        Err(e) => {
            log::warn!("Invoice delete failed: {e}");
            flash_error(&cookies, "Something went wrong");
        }
    }
    Redirect::to("/invoices").into_response()
}
