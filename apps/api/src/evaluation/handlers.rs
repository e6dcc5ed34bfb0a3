use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::engine::Evaluation;
use crate::evaluation::models::Turn;
use crate::extract::ApiJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    /// Only used for logging.
    pub scenario_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<Turn>,
}

/// POST /api/v1/evaluate
///
/// Scores the finished transcript. Backend outages fall back to the heuristic
/// scorer, so the only failures are malformed request bodies.
pub async fn handle_evaluate(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<EvaluateRequest>,
) -> Result<Json<Evaluation>, AppError> {
    info!(
        "Evaluating {} turns for scenario {}",
        req.messages.len(),
        req.scenario_id.as_deref().unwrap_or("(unknown)")
    );
    Ok(Json(state.evaluator.evaluate(&req.messages).await))
}
