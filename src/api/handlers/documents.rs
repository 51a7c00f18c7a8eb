use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::{internal_error, not_found, wizard_error, ApiResult};
use crate::api::AppState;
use crate::export::{format_date, sanitize_markdown};
use crate::llm::DocumentationRequest;
use crate::models::*;
use crate::wizard::WizardError;

pub async fn list_documents(State(state): State<AppState>) -> ApiResult<Json<Vec<DocumentHistory>>> {
    state.db.get_all_documents().map(Json).map_err(internal_error)
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DocumentHistory>> {
    state
        .db
        .get_document(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Document"))
}

pub async fn create_document(
    State(state): State<AppState>,
    Json(input): Json<CreateDocumentInput>,
) -> ApiResult<(StatusCode, Json<DocumentHistory>)> {
    if input.title.trim().is_empty() || input.content.trim().is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Document title and content are required".to_string(),
        ));
    }
    state
        .db
        .create_document(input)
        .map(|d| (StatusCode::CREATED, Json(d)))
        .map_err(internal_error)
}

pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.db.delete_document(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Document"))
    }
}

pub async fn clear_documents(State(state): State<AppState>) -> ApiResult<StatusCode> {
    let removed = state.db.clear_documents().map_err(internal_error)?;
    tracing::info!("Cleared {} documents from history", removed);
    Ok(StatusCode::NO_CONTENT)
}

/// Generate a document from a stored template. The result is not saved.
pub async fn generate_document(
    State(state): State<AppState>,
    Json(input): Json<GenerateDocumentInput>,
) -> ApiResult<Json<GeneratedDocument>> {
    if input.input.trim().is_empty() {
        return Err(wizard_error(WizardError::validation("Input cannot be empty")));
    }

    let template = state
        .db
        .get_template(input.template_id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Template"))?;

    let request = DocumentationRequest {
        template_name: template.name.clone(),
        instructions: template.description.clone(),
        skeleton: template.content.clone(),
        user_input: input.input,
    };

    tracing::info!("Generating documentation with template '{}'", template.name);
    let content = state
        .generator
        .generate_documentation(&request)
        .await
        .map_err(|e| wizard_error(e.into()))?;

    Ok(Json(GeneratedDocument {
        title: format!("{} - {}", template.name, format_date(Utc::now().date_naive())),
        content: sanitize_markdown(&content),
        template_id: template.id,
    }))
}
