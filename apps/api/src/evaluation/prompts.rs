// Prompt text for model-backed transcript scoring.

use crate::evaluation::models::{coach_turn_count, Role, Turn};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;

/// Grading rubric. `{json_only}` is filled with the shared JSON-only fragment.
const EVAL_SYSTEM_TEMPLATE: &str = r#"You are an expert RA/TA communication coach. The Coach is the RA/TA in training; the Persona is the student or resident they are helping. Score the Coach's performance across the ENTIRE conversation transcript, not just their most recent reply.

Return a JSON object with this EXACT shape:
{
  "empathy": <integer 1-5>,
  "curiosity": <integer 1-5>,
  "structure": <integer 1-5>,
  "satisfaction": <integer 1-10>,
  "resolved": <boolean>,
  "summary": "<2-4 sentences that reference specific moments or patterns from the entire conversation. Include at least one strength and one coaching suggestion.>"
}

- Empathy reflects how well the Coach validates feelings and shows understanding.
- Curiosity reflects how the Coach asks open questions that invite more sharing.
- Structure reflects how organized the Coach's responses are (summaries, next steps, clear focus).
- Satisfaction reflects how consoled and settled the Persona appears by the end; higher scores require signs of closure in both people's turns.
- resolved must be true ONLY when the Persona seems satisfied and next steps are clear enough that the conversation can end.

{json_only}"#;

pub fn evaluation_system_prompt() -> String {
    EVAL_SYSTEM_TEMPLATE.replace("{json_only}", JSON_ONLY_INSTRUCTION)
}

/// Renders turns as `Coach:` / `Persona:` lines separated by blank lines.
pub fn format_transcript(transcript: &[Turn]) -> String {
    transcript
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::Coach => "Coach",
                Role::Persona => "Persona",
            };
            format!("{speaker}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_evaluation_prompt(transcript: &[Turn]) -> String {
    format!(
        "Evaluate the Coach's empathy, curiosity, and structure using the rubric. \
         There have been {} Coach replies. Consider the ENTIRE conversation when scoring - \
         do not focus on only the final message.\n\nTranscript:\n{}",
        coach_turn_count(transcript),
        format_transcript(transcript)
    )
}
