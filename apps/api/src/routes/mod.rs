pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::chat::handlers as chat;
use crate::evaluation::handlers as evaluation;
use crate::history::handlers as history;
use crate::scenarios::handlers as scenarios;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Scenario catalog
        .route("/api/v1/tracks", get(scenarios::handle_list_tracks))
        .route("/api/v1/tracks/:id", get(scenarios::handle_get_track))
        .route("/api/v1/scenarios/:id", get(scenarios::handle_get_scenario))
        .route(
            "/api/v1/custom-scenarios",
            get(scenarios::handle_list_custom).post(scenarios::handle_save_custom),
        )
        .route(
            "/api/v1/custom-scenarios/:id",
            delete(scenarios::handle_delete_custom),
        )
        // Practice session
        .route("/api/v1/chat", post(chat::handle_chat))
        .route("/api/v1/evaluate", post(evaluation::handle_evaluate))
        // Conversation history
        .route(
            "/api/v1/history",
            get(history::handle_list_history).post(history::handle_create_history),
        )
        .route(
            "/api/v1/history/:id",
            get(history::handle_get_history)
                .put(history::handle_update_history)
                .delete(history::handle_delete_history),
        )
        .with_state(state)
}
