use std::sync::Arc;

use crate::chat::persona::PersonaResponder;
use crate::config::Config;
use crate::evaluation::engine::Evaluator;
use crate::evaluation::model_scorer::ModelScorer;
use crate::history::repository::Repository;
use crate::history::store::ConversationStore;
use crate::llm_client::TextGenerator;
use crate::scenarios::custom::CustomScenarioStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Model-backed scorer with heuristic fallback, or heuristic only when
    /// ENABLE_MODEL_SCORING is off.
    pub evaluator: Arc<Evaluator>,
    pub persona: Arc<PersonaResponder>,
    pub conversations: ConversationStore,
    pub custom_scenarios: CustomScenarioStore,
}

impl AppState {
    /// Wires the model backend and storage according to the feature flags in `config`.
    pub fn new(config: Config, llm: Arc<dyn TextGenerator>, repo: Arc<dyn Repository>) -> Self {
        let evaluator = if config.enable_model_scoring {
            Evaluator::new(Arc::new(ModelScorer::new(llm.clone())))
        } else {
            Evaluator::heuristic_only()
        };
        let persona = if config.enable_model_chat {
            PersonaResponder::new(llm)
        } else {
            PersonaResponder::canned_only()
        };

        Self {
            config,
            evaluator: Arc::new(evaluator),
            persona: Arc::new(persona),
            conversations: ConversationStore::new(repo.clone()),
            custom_scenarios: CustomScenarioStore::new(repo),
        }
    }
}
