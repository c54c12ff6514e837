use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use diesel::OptionalExtension;
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::invoicing::error::InvoicingError;
use crate::invoicing::forms::ClientForm;
use crate::invoicing::storage::{
    delete_client, find_client_by_slug, insert_client, list_clients, update_client,
};
use crate::invoicing::ui;
use crate::shared::state::AppState;
use crate::web::auth::AuthenticatedUser;
use crate::web::flash::{flash_error, flash_success};

use super::{redirect_with_error, render, tenant, with_conn};

pub async fn handle_clients_page(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
) -> Result<Html<String>, InvoicingError> {
    let company_id = tenant(&user)?;
    let clients = with_conn(&state, move |conn| Ok(list_clients(conn, company_id)?)).await?;
    Ok(render(&user, &cookies, "Clients", &ui::clients_page(&clients)))
}

pub async fn handle_create_client(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Form(form): Form<ClientForm>,
) -> Result<Response, InvoicingError> {
    let company_id = tenant(&user)?;

    let details = match form.validate() {
        Ok(details) => details,
        Err(e) => return Ok(redirect_with_error(&cookies, &e, "/clients")),
    };

    let client = with_conn(&state, move |conn| Ok(insert_client(conn, company_id, details)?)).await?;
    log::info!("Created client {}", client.slug);

    flash_success(&cookies, "New Client Added");
    Ok(Redirect::to("/clients").into_response())
}

pub async fn handle_edit_client_page(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
) -> Result<Html<String>, InvoicingError> {
    let company_id = tenant(&user)?;
    let client = with_conn(&state, move |conn| {
        find_client_by_slug(conn, company_id, &slug)
            .optional()?
            .ok_or_else(|| InvoicingError::NotFound(format!("Client {slug}")))
    })
    .await?;
    Ok(render(
        &user,
        &cookies,
        "Edit client",
        &ui::client_edit_page(&client),
    ))
}

pub async fn handle_update_client(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
    Form(form): Form<ClientForm>,
) -> Result<Response, InvoicingError> {
    let company_id = tenant(&user)?;

    let details = match form.validate() {
        Ok(details) => details,
        Err(e) => {
            return Ok(redirect_with_error(
                &cookies,
                &e,
                &format!("/clients/{slug}/edit"),
            ))
        }
    };

    let updated = with_conn(&state, move |conn| {
        let existing = find_client_by_slug(conn, company_id, &slug)
            .optional()?
            .ok_or_else(|| InvoicingError::NotFound(format!("Client {slug}")))?;
        Ok(update_client(conn, &existing, details)?)
    })
    .await?;

    flash_success(&cookies, "Client updated");
    log::info!("Updated client {}", updated.slug);
    Ok(Redirect::to("/clients").into_response())
}

pub async fn handle_delete_client(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Path(slug): Path<String>,
) -> Result<Response, InvoicingError> {
    let company_id = tenant(&user)?;

    let result = with_conn(&state, move |conn| {
        delete_client(conn, company_id, &slug)?;
        Ok(slug)
    })
    .await;

    match result {
        Ok(slug) => {
            log::info!("Deleted client {slug}");
            flash_success(&cookies, "Client deleted");
        }
        Err(e) => {
            log::warn!("Client delete failed: {e}");
            flash_error(&cookies, "Something went wrong");
        }
    }
    Ok(Redirect::to("/clients").into_response())
}
