// Transcript evaluation: turns a practice conversation into bounded skill scores
// plus coaching text. The model-backed scorer is best-effort; the heuristic
// scorer always answers.

pub mod engine;
pub mod extraction;
pub mod handlers;
pub mod heuristic;
pub mod model_scorer;
pub mod models;
pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;

use crate::evaluation::extraction::ExtractionError;
use crate::evaluation::models::{Feedback, Turn};
use crate::llm_client::LlmError;

/// Why a scorer could not produce feedback this time. Never reaches HTTP callers.
#[derive(Debug, Error)]
pub enum ScoringUnavailable {
    #[error("transcript has no coach turns")]
    NoCoachTurns,

    #[error("model backend failed: {0}")]
    Backend(#[from] LlmError),

    #[error("model reply unusable: {0}")]
    UnusableReply(#[from] ExtractionError),
}

/// The scorer trait. Implement this to add a backend without touching the
/// evaluator or the handlers.
#[async_trait]
pub trait FeedbackScorer: Send + Sync {
    /// Short label reported alongside the feedback ("model", "heuristic").
    fn backend(&self) -> &'static str;

    async fn score(&self, transcript: &[Turn]) -> Result<Feedback, ScoringUnavailable>;
}
