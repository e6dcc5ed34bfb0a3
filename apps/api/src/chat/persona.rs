//! Persona replies: relay the conversation to the model in character, or
//! answer with a canned line when the model is off or failing.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::evaluation::models::{Role, Turn};
use crate::llm_client::{ChatMessage, TextGenerator};
use crate::scenarios::catalog::{Scenario, TrackId};
use crate::scenarios::custom::{build_persona_prompt, CustomScenario};

const SNIPPET_CHARS: usize = 80;
const DEFAULT_OPENING: &str = "Thanks for hearing me out. ";

/// Everything needed to voice one scenario's persona.
#[derive(Debug, Clone)]
pub struct PersonaProfile {
    pub scenario_id: String,
    pub system_prompt: String,
}

impl PersonaProfile {
    pub fn from_builtin(scenario: &Scenario) -> Self {
        let notes = format!(
            "You opened the conversation by saying: \"{}\"",
            scenario.opening_line
        );
        Self {
            scenario_id: scenario.id.to_string(),
            system_prompt: build_persona_prompt(
                scenario.track_id,
                scenario.title,
                scenario.short_description,
                &notes,
            ),
        }
    }

    pub fn from_custom(scenario: &CustomScenario) -> Self {
        Self {
            scenario_id: scenario.id.clone(),
            system_prompt: scenario.persona_prompt(),
        }
    }

    /// Unknown scenario ids still get a reasonable persona.
    pub fn generic(scenario_id: &str) -> Self {
        let track = if scenario_id.starts_with("ta-") {
            TrackId::Ta
        } else {
            TrackId::Ra
        };
        Self {
            scenario_id: scenario_id.to_string(),
            system_prompt: build_persona_prompt(track, "Open conversation", "", ""),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonaReply {
    pub reply: String,
    /// "model" | "canned"
    pub source: &'static str,
}

pub struct PersonaResponder {
    llm: Option<Arc<dyn TextGenerator>>,
}

impl PersonaResponder {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm: Some(llm) }
    }

    pub fn canned_only() -> Self {
        Self { llm: None }
    }

    pub async fn reply(&self, profile: &PersonaProfile, transcript: &[Turn]) -> PersonaReply {
        if let Some(llm) = &self.llm {
            let messages = build_messages(profile, transcript);
            match llm.generate(&messages).await {
                Ok(reply) if !reply.trim().is_empty() => {
                    return PersonaReply {
                        reply: reply.trim().to_string(),
                        source: "model",
                    };
                }
                Ok(_) => warn!("Persona model returned an empty reply for {}", profile.scenario_id),
                Err(e) => warn!("Persona model unavailable for {}: {e}", profile.scenario_id),
            }
        }

        PersonaReply {
            reply: canned_reply(&profile.scenario_id, last_coach_message(transcript)),
            source: "canned",
        }
    }
}

fn build_messages(profile: &PersonaProfile, transcript: &[Turn]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(transcript.len() + 1);
    messages.push(ChatMessage::system(profile.system_prompt.clone()));
    messages.extend(transcript.iter().map(|turn| match turn.role {
        Role::Coach => ChatMessage::user(turn.content.clone()),
        Role::Persona => ChatMessage::assistant(turn.content.clone()),
    }));
    messages
}

fn last_coach_message(transcript: &[Turn]) -> Option<&str> {
    transcript
        .iter()
        .rev()
        .find(|t| t.role == Role::Coach)
        .map(|t| t.content.as_str())
}

fn opening_for(scenario_id: &str) -> &'static str {
    match scenario_id {
        "ra-noise-complaint" => {
            "Thanks for taking this seriously. The noise has really been getting to me. "
        }
        "ra-homesick" => {
            "I appreciate you listening. Being away from home has been harder than I thought. "
        }
        "ta-failed-midterm" => {
            "I put so much time into studying and still did badly, which is really discouraging. "
        }
        "ta-extension-request" => {
            "I know I should have started earlier, but things really piled up this week. "
        }
        _ => DEFAULT_OPENING,
    }
}

/// Deterministic stand-in reply that echoes the coach's last words.
pub fn canned_reply(scenario_id: &str, last_coach_message: Option<&str>) -> String {
    let opening = opening_for(scenario_id);

    let Some(message) = last_coach_message else {
        return format!("{opening}Could you tell me a bit more about how you see the situation?");
    };

    let snippet = if message.chars().count() > SNIPPET_CHARS {
        let head: String = message.chars().take(SNIPPET_CHARS).collect();
        format!("{head}…")
    } else {
        message.to_string()
    };

    format!(
        "{opening}When you said \"{snippet}\", that really captures how I'm feeling. \
         What do you think might help next?"
    )
}
