use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::chat::persona::{PersonaProfile, PersonaReply};
use crate::errors::AppError;
use crate::evaluation::models::Turn;
use crate::extract::ApiJson;
use crate::scenarios::catalog::get_scenario;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub scenario_id: String,
    #[serde(default)]
    pub messages: Vec<Turn>,
    /// Needed only to resolve custom scenarios.
    pub user_id: Option<Uuid>,
}

/// POST /api/v1/chat
///
/// Always answers with a persona line; model outages degrade to the canned reply.
pub async fn handle_chat(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> Result<Json<PersonaReply>, AppError> {
    let profile = resolve_profile(&state, &req).await?;
    Ok(Json(state.persona.reply(&profile, &req.messages).await))
}

async fn resolve_profile(state: &AppState, req: &ChatRequest) -> Result<PersonaProfile, AppError> {
    if let Some(scenario) = get_scenario(&req.scenario_id) {
        return Ok(PersonaProfile::from_builtin(scenario));
    }
    if let Some(user_id) = req.user_id {
        if let Some(custom) = state.custom_scenarios.get(user_id, &req.scenario_id).await? {
            return Ok(PersonaProfile::from_custom(&custom));
        }
    }
    Ok(PersonaProfile::generic(&req.scenario_id))
}
