use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::history::handlers::UserIdQuery;
use crate::scenarios::catalog::{get_scenario, get_track, tracks, Scenario, Track, TrackId};
use crate::scenarios::custom::{CustomScenario, NewCustomScenario};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct OptionalUserQuery {
    pub user_id: Option<Uuid>,
}

/// A scenario as the practice screen needs it, built-in or custom.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScenarioDetail {
    Builtin(Scenario),
    Custom(CustomScenario),
}

/// GET /api/v1/tracks
pub async fn handle_list_tracks() -> Json<&'static [Track]> {
    Json(tracks())
}

/// GET /api/v1/tracks/:id
pub async fn handle_get_track(
    ApiPath(id): ApiPath<TrackId>,
) -> Result<Json<&'static Track>, AppError> {
    get_track(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Track {} not found", id.as_str())))
}

/// GET /api/v1/scenarios/:id
///
/// Built-in scenarios first; custom ones need `user_id`.
pub async fn handle_get_scenario(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<OptionalUserQuery>,
) -> Result<Json<ScenarioDetail>, AppError> {
    if let Some(scenario) = get_scenario(&id) {
        return Ok(Json(ScenarioDetail::Builtin(scenario.clone())));
    }
    if let Some(user_id) = params.user_id {
        if let Some(custom) = state.custom_scenarios.get(user_id, &id).await? {
            return Ok(Json(ScenarioDetail::Custom(custom)));
        }
    }
    Err(AppError::NotFound(format!("Scenario {id} not found")))
}

/// GET /api/v1/custom-scenarios
pub async fn handle_list_custom(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserIdQuery>,
) -> Result<Json<Vec<CustomScenario>>, AppError> {
    Ok(Json(state.custom_scenarios.list(params.user_id).await?))
}

/// POST /api/v1/custom-scenarios
pub async fn handle_save_custom(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserIdQuery>,
    ApiJson(req): ApiJson<NewCustomScenario>,
) -> Result<(StatusCode, Json<CustomScenario>), AppError> {
    let scenario = state.custom_scenarios.save(params.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(scenario)))
}

/// DELETE /api/v1/custom-scenarios/:id
pub async fn handle_delete_custom(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(params): ApiQuery<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    state.custom_scenarios.delete(params.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
