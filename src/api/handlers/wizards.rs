use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::{internal_error, markdown_download, wizard_error, ApiResult};
use crate::api::AppState;
use crate::export::{brief_to_markdown, download_file_name, format_date};
use crate::models::*;
use crate::wizard::WizardHandle;

fn session(state: &AppState, id: Uuid) -> ApiResult<WizardHandle> {
    state.wizards.get(id).map_err(wizard_error)
}

// ============================================================
// Sessions
// ============================================================

pub async fn create_wizard(State(state): State<AppState>) -> (StatusCode, Json<WizardView>) {
    let handle = state.wizards.create();
    (StatusCode::CREATED, Json(handle.view()))
}

pub async fn get_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WizardView>> {
    Ok(Json(session(&state, id)?.view()))
}

pub async fn delete_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.wizards.remove(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Session not found".to_string()))
    }
}

pub async fn reset_wizard(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WizardView>> {
    session(&state, id)?
        .update(|w| {
            w.start_over();
            Ok(())
        })
        .map(Json)
        .map_err(wizard_error)
}

// ============================================================
// Idea and agenda
// ============================================================

pub async fn submit_idea(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SubmitIdeaInput>,
) -> ApiResult<Json<WizardView>> {
    session(&state, id)?
        .submit_idea(state.generator.as_ref(), &input.idea)
        .await
        .map(Json)
        .map_err(wizard_error)
}

pub async fn insert_dimension(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<InsertDimensionInput>,
) -> ApiResult<(StatusCode, Json<WizardView>)> {
    session(&state, id)?
        .update(|w| w.insert_dimension(input.dimension, input.index).map(|_| ()))
        .map(|view| (StatusCode::CREATED, Json(view)))
        .map_err(wizard_error)
}

pub async fn rename_dimension(
    State(state): State<AppState>,
    Path((id, dimension_id)): Path<(Uuid, String)>,
    Json(input): Json<RenameDimensionInput>,
) -> ApiResult<Json<WizardView>> {
    session(&state, id)?
        .update(|w| w.rename_dimension(&dimension_id, &input.name, &input.description))
        .map(Json)
        .map_err(wizard_error)
}

pub async fn remove_dimension(
    State(state): State<AppState>,
    Path((id, dimension_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<WizardView>> {
    session(&state, id)?
        .update(|w| w.remove_dimension(&dimension_id))
        .map(Json)
        .map_err(wizard_error)
}

pub async fn reorder_dimensions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ReorderDimensionsInput>,
) -> ApiResult<Json<WizardView>> {
    session(&state, id)?
        .update(|w| w.reorder_dimensions(input.from_index, input.to_index))
        .map(Json)
        .map_err(wizard_error)
}

pub async fn confirm_agenda(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ConfirmAgendaInput>,
) -> ApiResult<Json<WizardView>> {
    session(&state, id)?
        .confirm_agenda(input.dimensions)
        .map(Json)
        .map_err(wizard_error)
}

// ============================================================
// Options and selection
// ============================================================

pub async fn load_options(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<LoadOptionsInput>,
) -> ApiResult<Json<WizardView>> {
    session(&state, id)?
        .load_options(state.generator.as_ref(), input.extra_context)
        .await
        .map(Json)
        .map_err(wizard_error)
}

pub async fn edit_option(
    State(state): State<AppState>,
    Path((id, option_id)): Path<(Uuid, String)>,
    Json(input): Json<EditOptionInput>,
) -> ApiResult<Json<WizardView>> {
    session(&state, id)?
        .update(|w| w.edit_option(&option_id, &input.text))
        .map(Json)
        .map_err(wizard_error)
}

pub async fn select_option(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SelectOptionInput>,
) -> ApiResult<Json<WizardView>> {
    session(&state, id)?
        .update(|w| w.select_option(&input.dimension_id, &input.text, input.is_edited))
        .map(Json)
        .map_err(wizard_error)
}

pub async fn navigate_to(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<NavigateInput>,
) -> ApiResult<Json<WizardView>> {
    session(&state, id)?
        .update(|w| w.navigate_to(&input.dimension_id))
        .map(Json)
        .map_err(wizard_error)
}

// ============================================================
// Brief
// ============================================================

pub async fn get_brief(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Brief>> {
    session(&state, id)?.brief().map(Json).map_err(wizard_error)
}

pub async fn export_brief(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let brief = session(&state, id)?.brief().map_err(wizard_error)?;
    let markdown = brief_to_markdown(&brief, Utc::now().date_naive());
    Ok(markdown_download(&download_file_name("Idea Brief"), markdown))
}

/// Store the brief's Markdown in document history.
pub async fn save_brief(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<DocumentHistory>)> {
    let brief = session(&state, id)?.brief().map_err(wizard_error)?;
    let today = Utc::now().date_naive();

    let input = CreateDocumentInput {
        title: format!("Idea Brief - {}", format_date(today)),
        content: brief_to_markdown(&brief, today),
        template_id: None,
    };
    state
        .db
        .create_document(input)
        .map(|d| (StatusCode::CREATED, Json(d)))
        .map_err(internal_error)
}
