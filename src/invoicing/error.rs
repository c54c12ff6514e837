use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::web::layout::page;

#[derive(Debug, thiserror::Error)]
pub enum InvoicingError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Company settings not found. Please add your company settings first.")]
    SettingsMissing,
    #[error("wkhtmltopdf not found. Install wkhtmltopdf and/or set WKHTMLTOPDF_CMD.")]
    RendererMissing,
    #[error("PDF generation error: {0}")]
    Renderer(String),
    #[error("Email error: {0}")]
    Email(String),
    #[error("Your account is not linked to a company")]
    NoTenant,
}

impl InvoicingError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NoTenant => StatusCode::FORBIDDEN,
            Self::SettingsMissing | Self::RendererMissing => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_)
            | Self::Internal(_)
            | Self::Renderer(_)
            | Self::Email(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to show to the user; storage and task failures stay in the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Something went wrong".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<diesel::result::Error> for InvoicingError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            other => Self::Database(other.to_string()),
        }
    }
}

impl IntoResponse for InvoicingError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        }
        let body = format!(
            r#"<div class="card empty-state">
            <h2>{} {}</h2>
            <p>{}</p>
            <p style="margin-top: 16px"><a class="btn btn-primary" href="/dashboard">Back to dashboard</a></p>
        </div>"#,
            status.as_u16(),
            status.canonical_reason().unwrap_or("Error"),
            crate::shared::utils::html_escape(&self.user_message()),
        );
        (status, page("Error", None, None, &body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            InvoicingError::NotFound("invoice".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            InvoicingError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            InvoicingError::Database("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = InvoicingError::Database("relation \"clients\" does not exist".into());
        assert_eq!(err.user_message(), "Something went wrong");
        assert!(InvoicingError::RendererMissing
            .user_message()
            .contains("wkhtmltopdf"));
    }

    #[test]
    fn test_diesel_not_found_maps_to_not_found() {
        let err: InvoicingError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, InvoicingError::NotFound(_)));
    }

    #[test]
    fn test_into_response_status() {
        let response = InvoicingError::NotFound("invoice".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
