use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use std::sync::Arc;
use tower_cookies::Cookies;

use crate::invoicing::error::InvoicingError;
use crate::invoicing::forms::{BankDetailForm, SettingsForm};
use crate::invoicing::storage::{
    bank_details_for, first_settings, insert_bank_detail, insert_settings, update_settings,
};
use crate::invoicing::ui;
use crate::shared::state::AppState;
use crate::web::auth::AuthenticatedUser;
use crate::web::flash::{flash_success, set_flash, FlashLevel};

use super::{redirect_with_error, render, tenant, with_conn};

pub async fn handle_settings_page(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
) -> Result<Response, InvoicingError> {
    let company_id = tenant(&user)?;

    let found = with_conn(&state, move |conn| {
        match first_settings(conn, company_id)? {
            Some(settings) => {
                let banks = bank_details_for(conn, settings.id)?;
                Ok(Some((settings, banks)))
            }
            None => Ok(None),
        }
    })
    .await?;

    match found {
        Some((settings, banks)) => Ok(render(
            &user,
            &cookies,
            "Company settings",
            &ui::settings_page(&settings, &banks),
        )
        .into_response()),
        None => {
            set_flash(
                &cookies,
                FlashLevel::Info,
                "No company settings found. Please add them first.",
            );
            Ok(Redirect::to("/company/settings/edit").into_response())
        }
    }
}

pub async fn handle_settings_edit_page(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
) -> Result<Html<String>, InvoicingError> {
    let company_id = tenant(&user)?;
    let settings = with_conn(&state, move |conn| Ok(first_settings(conn, company_id)?)).await?;
    Ok(render(
        &user,
        &cookies,
        "Company settings",
        &ui::settings_edit_page(settings.as_ref()),
    ))
}

/// Creates the tenant's settings on first save, updates them afterwards.
pub async fn handle_save_settings(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Form(form): Form<SettingsForm>,
) -> Result<Response, InvoicingError> {
    let company_id = tenant(&user)?;

    let details = match form.validate() {
        Ok(details) => details,
        Err(e) => return Ok(redirect_with_error(&cookies, &e, "/company/settings/edit")),
    };

    let saved = with_conn(&state, move |conn| {
        Ok(match first_settings(conn, company_id)? {
            Some(existing) => update_settings(conn, &existing, details)?,
            None => insert_settings(conn, company_id, details)?,
        })
    })
    .await?;

    log::info!("Saved company settings {}", saved.slug);
    flash_success(&cookies, "Company settings saved");
    Ok(Redirect::to("/company/settings").into_response())
}

pub async fn handle_add_bank_account(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    cookies: Cookies,
    Form(form): Form<BankDetailForm>,
) -> Result<Response, InvoicingError> {
    let company_id = tenant(&user)?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(e) => return Ok(redirect_with_error(&cookies, &e, "/company/settings")),
    };

    let result = with_conn(&state, move |conn| {
        let settings = first_settings(conn, company_id)?.ok_or(InvoicingError::SettingsMissing)?;
        Ok(insert_bank_detail(conn, settings.id, input)?)
    })
    .await;

    match result {
        Ok(_) => {
            flash_success(&cookies, "Bank account added");
            Ok(Redirect::to("/company/settings").into_response())
        }
        Err(e @ InvoicingError::SettingsMissing) => {
            Ok(redirect_with_error(&cookies, &e, "/company/settings/edit"))
        }
        Err(e) => Err(e),
    }
}
