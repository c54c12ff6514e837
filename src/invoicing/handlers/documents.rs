//! Invoice document views: HTML, inline PDF and emailed PDF.

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::email::send_invoice_pdf;
use crate::invoicing::error::InvoicingError;
use crate::invoicing::storage::{load_invoice_document, set_invoice_status, InvoiceDocument};
use crate::invoicing::types::InvoiceStatus;
use crate::pdf::{render_invoice_html, DOWNLOAD_JS_DELAY_MS, EMAIL_JS_DELAY_MS};
use crate::shared::state::AppState;
use crate::web::auth::AuthenticatedUser;
use crate::web::flash::{flash_error, flash_success};

use super::{redirect_with_error, tenant, with_conn};

const INVOICES: &str = "/invoices";

async fn load_document(
    state: &AppState,
    user: &AuthenticatedUser,
    slug: String,
) -> Result<InvoiceDocument, InvoicingError> {
    let company_id = tenant(user)?;
    with_conn(state, move |conn| load_invoice_document(conn, company_id, &slug)).await
}

/// Errors the user can act on go back to the invoice list; anything else is
/// rendered as an error page.
fn document_error(cookies: &Cookies, err: InvoicingError) -> Response {
    match err {
        InvoicingError::NotFound(_) | InvoicingError::NoTenant => err.into_response(),
        other => redirect_with_error(cookies, &other, INVOICES),
    }
}

pub async fn handle_view_invoice(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
) -> Response {
    match load_document(&state, &user, slug).await {
        Ok(doc) => Html(render_invoice_html(&doc)).into_response(),
        Err(e) => document_error(&cookies, e),
    }
}

pub async fn handle_download_pdf(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
) -> Response {
    let renderer = match state.renderer.renderer() {
        Ok(renderer) => renderer,
        Err(e) => return redirect_with_error(&cookies, &e, INVOICES),
    };

    let doc = match load_document(&state, &user, slug).await {
        Ok(doc) => doc,
        Err(e) => return document_error(&cookies, e),
    };

    let html = render_invoice_html(&doc);
    match renderer.render_to_bytes(&html, DOWNLOAD_JS_DELAY_MS).await {
        Ok(pdf) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("inline; filename={}.pdf", doc.invoice.unique_id),
                ),
            ],
            pdf,
        )
            .into_response(),
        Err(e) => redirect_with_error(&cookies, &e, INVOICES),
    }
}

/// Persists the PDF under the media directory, mails it to the client and
/// marks the invoice as sent.
pub async fn handle_email_pdf(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
) -> Response {
    let renderer = match state.renderer.renderer() {
        Ok(renderer) => renderer,
        Err(e) => return redirect_with_error(&cookies, &e, INVOICES),
    };

    let doc = match load_document(&state, &user, slug).await {
        Ok(doc) => doc,
        Err(e) => return document_error(&cookies, e),
    };
    let back = format!("/invoices/create-build/{}", doc.invoice.slug);

    let pdf_path = state
        .config
        .invoice_pdf_dir()
        .join(format!("{}.pdf", doc.invoice.unique_id));
    let html = render_invoice_html(&doc);
    if let Err(e) = renderer
        .render_to_file(&html, EMAIL_JS_DELAY_MS, &pdf_path)
        .await
    {
        return redirect_with_error(&cookies, &e, INVOICES);
    }

    let Some(to) = doc
        .client
        .as_ref()
        .and_then(|c| c.email_address.clone())
    else {
        flash_error(
            &cookies,
            "Invoice PDF saved, but the client has no email address",
        );
        return Redirect::to(&back).into_response();
    };

    let email_config = state.config.email.clone();
    let sender = doc.settings.company_name.clone();
    let number = doc.invoice.number.clone();
    let sent = tokio::task::spawn_blocking(move || {
        send_invoice_pdf(&email_config, &to, sender.as_deref(), &number, &pdf_path)
    })
    .await
    .map_err(|e: tokio::task::JoinError| InvoicingError::Internal(e.to_string()))
    .and_then(|r| r);
    if let Err(e) = sent {
        return redirect_with_error(&cookies, &e, &back);
    }

    let invoice_id = doc.invoice.id;
    if let Err(e) = with_conn(&state, move |conn| {
        Ok(set_invoice_status(conn, invoice_id, InvoiceStatus::EmailSent)?)
    })
    .await
    {
        return redirect_with_error(&cookies, &e, &back);
    }

    flash_success(&cookies, "Email sent to the client successfully");
    Redirect::to(&back).into_response()
}
