use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::{internal_error, not_found, ApiResult};
use crate::api::AppState;
use crate::models::*;

fn validate(name: Option<&str>, content: Option<&str>) -> ApiResult<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "Template name cannot be empty".to_string()));
    }
    if content.is_some_and(|c| c.trim().is_empty()) {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "Template content cannot be empty".to_string()));
    }
    Ok(())
}

pub async fn list_templates(State(state): State<AppState>) -> ApiResult<Json<Vec<Template>>> {
    state.db.get_all_templates().map(Json).map_err(internal_error)
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Template>> {
    state
        .db
        .get_template(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Template"))
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(input): Json<CreateTemplateInput>,
) -> ApiResult<(StatusCode, Json<Template>)> {
    validate(Some(&input.name), Some(&input.content))?;
    state
        .db
        .create_template(input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(internal_error)
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTemplateInput>,
) -> ApiResult<Json<Template>> {
    validate(input.name.as_deref(), input.content.as_deref())?;
    state
        .db
        .update_template(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Template"))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.db.delete_template(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Template"))
    }
}
