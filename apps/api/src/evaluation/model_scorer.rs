//! Model-backed scorer: rubric prompt → text generator → JSON extraction.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::evaluation::extraction::parse_feedback_reply;
use crate::evaluation::models::{coach_turn_count, Feedback, Turn};
use crate::evaluation::prompts::{build_evaluation_prompt, evaluation_system_prompt};
use crate::evaluation::{FeedbackScorer, ScoringUnavailable};
use crate::llm_client::{ChatMessage, TextGenerator};

pub struct ModelScorer {
    llm: Arc<dyn TextGenerator>,
}

impl ModelScorer {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl FeedbackScorer for ModelScorer {
    fn backend(&self) -> &'static str {
        "model"
    }

    async fn score(&self, transcript: &[Turn]) -> Result<Feedback, ScoringUnavailable> {
        if coach_turn_count(transcript) == 0 {
            return Err(ScoringUnavailable::NoCoachTurns);
        }

        let messages = [
            ChatMessage::system(evaluation_system_prompt()),
            ChatMessage::user(build_evaluation_prompt(transcript)),
        ];

        let reply = self.llm.generate(&messages).await?;
        debug!("Evaluation reply: {} chars", reply.len());

        Ok(parse_feedback_reply(&reply)?)
    }
}
