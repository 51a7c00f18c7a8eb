use axum::{extract::State, Json};

use super::{wizard_error, ApiResult};
use crate::api::AppState;
use crate::mockup::generate_mockup;
use crate::models::{CreateMockupInput, MockupResult};

pub async fn create_mockup(
    State(state): State<AppState>,
    Json(input): Json<CreateMockupInput>,
) -> ApiResult<Json<MockupResult>> {
    generate_mockup(state.generator.as_ref(), state.images.as_ref(), input)
        .await
        .map(Json)
        .map_err(wizard_error)
}
