use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::history::store::{Conversation, NewConversation, UpdateConversation};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/history
pub async fn handle_list_history(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserIdQuery>,
) -> Result<Json<Vec<Conversation>>, AppError> {
    Ok(Json(state.conversations.list(params.user_id).await?))
}

/// POST /api/v1/history
pub async fn handle_create_history(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<UserIdQuery>,
    ApiJson(req): ApiJson<NewConversation>,
) -> Result<(StatusCode, Json<Conversation>), AppError> {
    let conversation = state.conversations.create(params.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

/// GET /api/v1/history/:id
pub async fn handle_get_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<UserIdQuery>,
) -> Result<Json<Conversation>, AppError> {
    Ok(Json(state.conversations.get(params.user_id, id).await?))
}

/// PUT /api/v1/history/:id
pub async fn handle_update_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<UserIdQuery>,
    ApiJson(req): ApiJson<UpdateConversation>,
) -> Result<Json<Conversation>, AppError> {
    Ok(Json(
        state.conversations.update(params.user_id, id, req).await?,
    ))
}

/// DELETE /api/v1/history/:id
pub async fn handle_delete_history(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    state.conversations.delete(params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
