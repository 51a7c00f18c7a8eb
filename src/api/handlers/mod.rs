mod documents;
mod mockups;
mod scopes;
mod templates;
mod wizards;

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::wizard::WizardError;

pub use documents::*;
pub use mockups::*;
pub use scopes::*;
pub use templates::*;
pub use wizards::*;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
/// The full error is logged server-side; clients only see a generic message.
fn internal_error(e: impl std::fmt::Display) -> (StatusCode, String) {
    tracing::error!("Internal error: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

/// Map a wizard failure to a status code and user-facing message.
fn wizard_error(e: WizardError) -> (StatusCode, String) {
    let status = match &e {
        WizardError::EmptyAgenda
        | WizardError::MinimumAgendaSize { .. }
        | WizardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WizardError::NotFound { .. } => StatusCode::NOT_FOUND,
        WizardError::InvalidStep { .. }
        | WizardError::NotActive(_)
        | WizardError::AgendaFrozen
        | WizardError::NotRevisitable(_)
        | WizardError::Busy(_)
        | WizardError::StaleResponse(_) => StatusCode::CONFLICT,
        WizardError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        WizardError::Generation(_) => StatusCode::BAD_GATEWAY,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", e);
    } else {
        tracing::warn!("Request rejected: {}", e);
    }
    (status, e.user_message())
}

fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{} not found", what))
}

/// Markdown body offered as a file download.
fn markdown_download(file_name: &str, body: String) -> impl IntoResponse {
    (
        [
            (
                axum::http::header::CONTENT_TYPE,
                "text/markdown; charset=utf-8".to_string(),
            ),
            (
                axum::http::header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::Operation;

    #[test]
    fn wizard_errors_map_to_statuses() {
        let cases = [
            (WizardError::EmptyAgenda, StatusCode::UNPROCESSABLE_ENTITY),
            (WizardError::dimension_not_found("x"), StatusCode::NOT_FOUND),
            (WizardError::Busy(Operation::LoadOptions), StatusCode::CONFLICT),
            (WizardError::AgendaFrozen, StatusCode::CONFLICT),
            (
                WizardError::Configuration("OPENAI_API_KEY is not set".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (WizardError::Generation("boom".to_string()), StatusCode::BAD_GATEWAY),
        ];

        for (error, expected) in cases {
            assert_eq!(wizard_error(error).0, expected);
        }
    }

    #[test]
    fn configuration_errors_hide_details() {
        let (_, message) = wizard_error(WizardError::Configuration("OPENAI_API_KEY is not set".to_string()));
        assert!(!message.contains("OPENAI_API_KEY"));
    }
}
