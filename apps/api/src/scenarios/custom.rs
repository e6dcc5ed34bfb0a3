//! User-authored scenarios, stored per user under `custom-scenarios:{user_id}`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::history::repository::{get_json, put_json, Repository};
use crate::llm_client::prompts::PERSONA_GOALS;
use crate::scenarios::catalog::TrackId;

const DEFAULT_PERSONA_NOTES: &str = "(no additional notes)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomScenario {
    pub id: String,
    pub track_id: TrackId,
    pub title: String,
    pub short_description: String,
    pub persona_notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomScenario {
    pub track_id: TrackId,
    pub title: String,
    pub short_description: String,
    #[serde(default)]
    pub persona_notes: String,
}

/// `"Loud Neighbors!!"` on the RA track becomes `"ra-loud-neighbors"`.
pub fn slugify(input: &str, track: TrackId) -> String {
    let cleaned: String = input
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace() || *c == '-')
        .collect();

    let mut base = String::with_capacity(cleaned.len());
    for word in cleaned.split_whitespace() {
        if !base.is_empty() {
            base.push('-');
        }
        base.push_str(word);
    }

    let mut collapsed = String::with_capacity(base.len());
    for c in base.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    if collapsed.is_empty() {
        format!("{}-new-scenario", track.as_str())
    } else {
        format!("{}-{collapsed}", track.as_str())
    }
}

/// Role-play system prompt for a persona.
pub fn build_persona_prompt(
    track: TrackId,
    title: &str,
    short_description: &str,
    persona_notes: &str,
) -> String {
    let description = if short_description.trim().is_empty() {
        "(no description)"
    } else {
        short_description
    };
    let notes = if persona_notes.trim().is_empty() {
        DEFAULT_PERSONA_NOTES
    } else {
        persona_notes
    };

    format!(
        "You are role-playing as a {} in the following scenario:\n\n\
         Title: {title}\n\
         Description: {description}\n\
         Additional notes from the training designer:\n\
         {notes}\n\n\
         {PERSONA_GOALS}",
        track.persona_noun()
    )
}

impl CustomScenario {
    pub fn persona_prompt(&self) -> String {
        build_persona_prompt(
            self.track_id,
            &self.title,
            &self.short_description,
            &self.persona_notes,
        )
    }
}

#[derive(Clone)]
pub struct CustomScenarioStore {
    repo: Arc<dyn Repository>,
    write_lock: Arc<Mutex<()>>,
}

fn key_for(user_id: Uuid) -> String {
    format!("custom-scenarios:{user_id}")
}

impl CustomScenarioStore {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<CustomScenario>, AppError> {
        Ok(get_json(self.repo.as_ref(), &key_for(user_id))
            .await?
            .unwrap_or_default())
    }

    pub async fn get(&self, user_id: Uuid, id: &str) -> Result<Option<CustomScenario>, AppError> {
        Ok(self.list(user_id).await?.into_iter().find(|s| s.id == id))
    }

    /// Saving a title that slugs to an existing id replaces that scenario in place.
    pub async fn save(
        &self,
        user_id: Uuid,
        request: NewCustomScenario,
    ) -> Result<CustomScenario, AppError> {
        let title = request.title.trim();
        let short_description = request.short_description.trim();
        if title.is_empty() || short_description.is_empty() {
            return Err(AppError::Validation(
                "title and shortDescription are required".to_string(),
            ));
        }

        let scenario = CustomScenario {
            id: slugify(title, request.track_id),
            track_id: request.track_id,
            title: title.to_string(),
            short_description: short_description.to_string(),
            persona_notes: request.persona_notes.trim().to_string(),
            created_at: Utc::now(),
        };

        let _guard = self.write_lock.lock().await;
        let mut scenarios = self.list(user_id).await?;
        match scenarios.iter_mut().find(|s| s.id == scenario.id) {
            Some(existing) => *existing = scenario.clone(),
            None => scenarios.insert(0, scenario.clone()),
        }
        put_json(self.repo.as_ref(), &key_for(user_id), &scenarios).await?;

        info!("Saved custom scenario {} for user {user_id}", scenario.id);
        Ok(scenario)
    }

    pub async fn delete(&self, user_id: Uuid, id: &str) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut scenarios = self.list(user_id).await?;
        let before = scenarios.len();
        scenarios.retain(|s| s.id != id);
        if scenarios.len() == before {
            return Err(AppError::NotFound(format!("Custom scenario {id} not found")));
        }
        if scenarios.is_empty() {
            self.repo.delete(&key_for(user_id)).await?;
        } else {
            put_json(self.repo.as_ref(), &key_for(user_id), &scenarios).await?;
        }
        Ok(())
    }
}
