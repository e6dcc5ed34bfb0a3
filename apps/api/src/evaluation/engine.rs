//! Evaluator: picks the scorer for an "end scenario" request.
//!
//! Policy: one attempt at the primary (model-backed) scorer, then the heuristic.
//! No retries; the model backend is enrichment, not a dependency.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::evaluation::heuristic::{score_transcript, HeuristicScorer};
use crate::evaluation::models::{Feedback, Turn};
use crate::evaluation::FeedbackScorer;

/// Feedback plus the backend that produced it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub feedback: Feedback,
    pub scorer_backend: &'static str,
}

pub struct Evaluator {
    primary: Option<Arc<dyn FeedbackScorer>>,
    fallback: HeuristicScorer,
}

impl Evaluator {
    pub fn new(primary: Arc<dyn FeedbackScorer>) -> Self {
        Self {
            primary: Some(primary),
            fallback: HeuristicScorer,
        }
    }

    /// Evaluator that never calls a model.
    pub fn heuristic_only() -> Self {
        Self {
            primary: None,
            fallback: HeuristicScorer,
        }
    }

    /// Always produces feedback; backend outages only change which scorer ran.
    pub async fn evaluate(&self, transcript: &[Turn]) -> Evaluation {
        if let Some(primary) = &self.primary {
            match primary.score(transcript).await {
                Ok(feedback) => {
                    info!(
                        "Transcript scored by {} backend ({} turns)",
                        primary.backend(),
                        transcript.len()
                    );
                    return Evaluation {
                        feedback,
                        scorer_backend: primary.backend(),
                    };
                }
                Err(e) => warn!(
                    "{} scoring unavailable, falling back to {}: {e}",
                    primary.backend(),
                    self.fallback.backend()
                ),
            }
        }

        Evaluation {
            feedback: score_transcript(transcript),
            scorer_backend: self.fallback.backend(),
        }
    }
}
