use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use super::{markdown_download, wizard_error, ApiResult};
use crate::api::AppState;
use crate::export::{download_file_name, scope_to_markdown};
use crate::models::*;
use crate::wizard::ScopeHandle;

fn session(state: &AppState, id: Uuid) -> ApiResult<ScopeHandle> {
    state.scopes.get(id).map_err(wizard_error)
}

pub async fn create_scope(State(state): State<AppState>) -> (StatusCode, Json<ScopeView>) {
    let handle = state.scopes.create();
    (StatusCode::CREATED, Json(handle.view()))
}

pub async fn get_scope(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ScopeView>> {
    Ok(Json(session(&state, id)?.view()))
}

pub async fn submit_prompt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SubmitPromptInput>,
) -> ApiResult<Json<ScopeView>> {
    session(&state, id)?
        .submit_prompt(state.generator.as_ref(), &input.prompt)
        .await
        .map(Json)
        .map_err(wizard_error)
}

pub async fn include_idea(
    State(state): State<AppState>,
    Path((id, idea_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<ScopeView>> {
    session(&state, id)?
        .update(|s| s.include(&idea_id))
        .map(Json)
        .map_err(wizard_error)
}

pub async fn dismiss_idea(
    State(state): State<AppState>,
    Path((id, idea_id)): Path<(Uuid, String)>,
) -> ApiResult<Json<ScopeView>> {
    session(&state, id)?
        .update(|s| s.dismiss(&idea_id))
        .map(Json)
        .map_err(wizard_error)
}

pub async fn draft_scope(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ScopeView>> {
    session(&state, id)?
        .update(|s| s.draft())
        .map(Json)
        .map_err(wizard_error)
}

pub async fn edit_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<EditDraftInput>,
) -> ApiResult<Json<ScopeView>> {
    session(&state, id)?
        .update(|s| s.edit_draft(input))
        .map(Json)
        .map_err(wizard_error)
}

pub async fn finalize_scope(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ScopeView>> {
    session(&state, id)?
        .update(|s| s.finalize())
        .map(Json)
        .map_err(wizard_error)
}

pub async fn scope_back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ScopeView>> {
    session(&state, id)?
        .update(|s| {
            s.back();
            Ok(())
        })
        .map(Json)
        .map_err(wizard_error)
}

pub async fn reset_scope(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ScopeView>> {
    session(&state, id)?
        .update(|s| {
            s.start_over();
            Ok(())
        })
        .map(Json)
        .map_err(wizard_error)
}

/// Download the finalized scope document as Markdown.
pub async fn export_scope(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let (file_name, markdown) = session(&state, id)?
        .read(|s| {
            s.final_document().map(|doc| {
                (
                    download_file_name(&doc.title),
                    scope_to_markdown(doc, Utc::now().date_naive()),
                )
            })
        })
        .map_err(wizard_error)?;
    Ok(markdown_download(&file_name, markdown))
}
