//! Heuristic scorer: keyword and punctuation counting over the coach's own words.
//!
//! Always succeeds, so it is the guaranteed fallback behind the model-backed scorer.
//!
//! Algorithm:
//! 1. empathy      = 2 + 0.7 × (empathy markers present)
//! 2. curiosity    = 1 + (number of `?`)
//! 3. structure    = 1 + 0.6 × (non-empty sentences split on `.`, `!`, `?`)
//! 4. satisfaction = mean(1..3) × 1.4 + min(4, (coach turns − 1) × 1.2) + min(3, closure markers × 1.5)
//! 5. resolved     = ceiling rule (see `models::meets_resolution_ceiling`)
//!
//! Each score is rounded and clamped before it feeds the next step.

use async_trait::async_trait;

use crate::evaluation::models::{
    clamp_score, clamp_score_10, coach_text, coach_turn_count, meets_resolution_ceiling,
    Feedback, Turn,
};
use crate::evaluation::{FeedbackScorer, ScoringUnavailable};

pub const EMPATHY_MARKERS: &[&str] = &[
    "that sounds",
    "i'm sorry",
    "i am sorry",
    "i can see",
    "i understand",
    "makes sense",
    "that must be",
    "thanks for sharing",
    "thank you for sharing",
];

pub const CLOSURE_MARKERS: &[&str] = &[
    "glad we could",
    "does that help",
    "does this help",
    "let me know if anything else comes up",
    "reach out",
    "keep me posted",
    "touch base",
    "next time we meet",
    "check back",
];

const RUBRIC_STRENGTH_THRESHOLD: u8 = 4;
const SATISFACTION_STRENGTH_THRESHOLD: u8 = 8;

/// Stateless keyword scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

#[async_trait]
impl FeedbackScorer for HeuristicScorer {
    fn backend(&self) -> &'static str {
        "heuristic"
    }

    async fn score(&self, transcript: &[Turn]) -> Result<Feedback, ScoringUnavailable> {
        Ok(score_transcript(transcript))
    }
}

/// Scores a transcript. Pure and deterministic.
pub fn score_transcript(transcript: &[Turn]) -> Feedback {
    let text = coach_text(transcript);
    let lower = text.to_lowercase();

    let empathy_hits = count_markers(&lower, EMPATHY_MARKERS);
    let empathy = clamp_score(2.0 + empathy_hits as f64 * 0.7);

    let question_count = text.chars().filter(|&c| c == '?').count();
    let curiosity = clamp_score(1.0 + question_count as f64);

    let sentences = count_sentences(&text);
    let structure = clamp_score(1.0 + sentences as f64 * 0.6);

    let closure_hits = count_markers(&lower, CLOSURE_MARKERS);
    let coach_turns = coach_turn_count(transcript);

    let avg_quality = (empathy as f64 + curiosity as f64 + structure as f64) / 3.0;
    let depth_bonus = (coach_turns.saturating_sub(1) as f64 * 1.2).min(4.0);
    let closure_bonus = (closure_hits as f64 * 1.5).min(3.0);
    let satisfaction = clamp_score_10(avg_quality * 1.4 + depth_bonus + closure_bonus);

    let resolved = meets_resolution_ceiling(empathy, curiosity, structure, satisfaction);

    Feedback {
        empathy,
        curiosity,
        structure,
        satisfaction,
        resolved,
        summary: build_summary(empathy, curiosity, structure, satisfaction, resolved),
    }
}

/// Number of distinct markers that appear at least once in `lower`.
fn count_markers(lower: &str, markers: &[&str]) -> usize {
    markers.iter().filter(|m| lower.contains(*m)).count()
}

fn count_sentences(text: &str) -> usize {
    text.split(|c: char| matches!(c, '.' | '!' | '?'))
        .filter(|s| !s.trim().is_empty())
        .count()
}

fn build_summary(
    empathy: u8,
    curiosity: u8,
    structure: u8,
    satisfaction: u8,
    resolved: bool,
) -> String {
    let mut lines = vec!["Here is some quick feedback on your conversation.".to_string()];

    lines.push(pick(
        empathy >= RUBRIC_STRENGTH_THRESHOLD,
        "- You do a good job acknowledging feelings and showing empathy.",
        "- Try to explicitly name and validate the other person's feelings (e.g., \"That sounds really overwhelming.\").",
    ));
    lines.push(pick(
        curiosity >= RUBRIC_STRENGTH_THRESHOLD,
        "- You ask several questions that invite the other person to share more.",
        "- You could add a few more open-ended questions to better understand their situation.",
    ));
    lines.push(pick(
        structure >= RUBRIC_STRENGTH_THRESHOLD,
        "- Your responses are fairly organized and move toward a next step.",
        "- Consider briefly summarizing what you heard and suggesting one concrete next step so the conversation feels more structured.",
    ));
    lines.push(pick(
        satisfaction >= SATISFACTION_STRENGTH_THRESHOLD,
        "- The student likely feels more settled with your support; invite them to confirm they are OK wrapping up.",
        "- Before ending the chat, check that the student feels calmer and knows the next step.",
    ));
    lines.push(pick(
        resolved,
        "They seem satisfied, so you can celebrate closing the scenario.",
        "Keep the door open for more sharing until they signal the issue is resolved.",
    ));

    lines.join("\n")
}

fn pick(condition: bool, strong: &str, weak: &str) -> String {
    let line = if condition { strong } else { weak };
    line.to_string()
}
