//! Conversation history, one list per user, stored under `history:{user_id}`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::models::{Feedback, Turn};
use crate::history::repository::{get_json, put_json, Repository};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub track_id: String,
    pub scenario_id: String,
    pub scenario_title: String,
    pub messages: Vec<Turn>,
    pub feedback: Option<Feedback>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    pub track_id: Option<String>,
    pub scenario_id: Option<String>,
    pub scenario_title: Option<String>,
    pub messages: Option<Vec<Turn>>,
    pub feedback: Option<Feedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConversation {
    pub track_id: Option<String>,
    pub scenario_id: Option<String>,
    pub scenario_title: Option<String>,
    pub messages: Option<Vec<Turn>>,
    pub feedback: Option<Feedback>,
}

/// CRUD over per-user conversation lists.
///
/// Every mutation is a read-modify-write of the user's list, so writes take
/// `write_lock` for their whole duration.
#[derive(Clone)]
pub struct ConversationStore {
    repo: Arc<dyn Repository>,
    write_lock: Arc<Mutex<()>>,
}

fn key_for(user_id: Uuid) -> String {
    format!("history:{user_id}")
}

fn check_feedback(feedback: Option<&Feedback>) -> Result<(), AppError> {
    feedback.map_or(Ok(()), |f| f.validate().map_err(AppError::Validation))
}

fn required(field: Option<String>, name: &str) -> Result<String, AppError> {
    field
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))
}

impl ConversationStore {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError> {
        Ok(get_json(self.repo.as_ref(), &key_for(user_id))
            .await?
            .unwrap_or_default())
    }

    /// An empty list removes the user's key altogether.
    async fn save(&self, user_id: Uuid, conversations: &[Conversation]) -> Result<(), AppError> {
        let key = key_for(user_id);
        if conversations.is_empty() {
            self.repo.delete(&key).await?;
        } else {
            put_json(self.repo.as_ref(), &key, conversations).await?;
        }
        Ok(())
    }

    /// Newest first by `started_at`.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Conversation>, AppError> {
        let mut conversations = self.load(user_id).await?;
        conversations.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(conversations)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<Conversation, AppError> {
        self.load(user_id)
            .await?
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Conversation {id} not found")))
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        request: NewConversation,
    ) -> Result<Conversation, AppError> {
        let track_id = required(request.track_id, "trackId")?;
        let scenario_id = required(request.scenario_id, "scenarioId")?;
        let scenario_title = required(request.scenario_title, "scenarioTitle")?;
        let messages = request
            .messages
            .ok_or_else(|| AppError::Validation("messages is required".to_string()))?;
        check_feedback(request.feedback.as_ref())?;

        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user_id,
            track_id,
            scenario_id,
            scenario_title,
            messages,
            feedback: request.feedback,
            started_at: now,
            ended_at: Some(now),
        };

        let _guard = self.write_lock.lock().await;
        let mut conversations = self.load(user_id).await?;
        conversations.push(conversation.clone());
        self.save(user_id, &conversations).await?;

        info!(
            "Saved conversation {} ({}) for user {user_id}",
            conversation.id, conversation.scenario_id
        );
        Ok(conversation)
    }

    /// Replaces messages and feedback; omitted scenario fields keep their old values.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateConversation,
    ) -> Result<Conversation, AppError> {
        let messages = request
            .messages
            .ok_or_else(|| AppError::Validation("messages is required".to_string()))?;
        check_feedback(request.feedback.as_ref())?;

        let _guard = self.write_lock.lock().await;
        let mut conversations = self.load(user_id).await?;
        let existing = conversations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Conversation {id} not found")))?;

        existing.messages = messages;
        existing.feedback = request.feedback;
        if let Some(scenario_id) = request.scenario_id {
            existing.scenario_id = scenario_id;
        }
        if let Some(scenario_title) = request.scenario_title {
            existing.scenario_title = scenario_title;
        }
        if let Some(track_id) = request.track_id {
            existing.track_id = track_id;
        }
        existing.ended_at = Some(Utc::now());

        let updated = existing.clone();
        self.save(user_id, &conversations).await?;
        Ok(updated)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;
        let mut conversations = self.load(user_id).await?;
        let before = conversations.len();
        conversations.retain(|c| c.id != id);
        if conversations.len() == before {
            return Err(AppError::NotFound(format!("Conversation {id} not found")));
        }
        self.save(user_id, &conversations).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::repository::InMemoryRepository;

    fn store() -> ConversationStore {
        ConversationStore::new(Arc::new(InMemoryRepository::new()))
    }

    fn new_conversation(scenario_id: &str) -> NewConversation {
        NewConversation {
            track_id: Some("ra".to_string()),
            scenario_id: Some(scenario_id.to_string()),
            scenario_title: Some("Noise Complaint on a Weeknight".to_string()),
            messages: Some(vec![
                Turn::persona("It's so loud."),
                Turn::coach("That sounds exhausting."),
            ]),
            feedback: None,
        }
    }

    fn sample_feedback() -> Feedback {
        Feedback {
            empathy: 3,
            curiosity: 2,
            structure: 2,
            satisfaction: 3,
            resolved: false,
            summary: "Keep going.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = store();
        let user = Uuid::new_v4();
        let created = store.create(user, new_conversation("ra-noise-complaint")).await.unwrap();
        assert_eq!(created.user_id, user);
        assert_eq!(created.messages.len(), 2);
        assert!(created.ended_at.is_some());

        let fetched = store.get(user, created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_requires_fields() {
        let store = store();
        let user = Uuid::new_v4();

        let mut missing_title = new_conversation("ra-homesick");
        missing_title.scenario_title = Some("   ".to_string());
        assert!(matches!(
            store.create(user, missing_title).await,
            Err(AppError::Validation(_))
        ));

        let mut missing_messages = new_conversation("ra-homesick");
        missing_messages.messages = None;
        assert!(matches!(
            store.create(user, missing_messages).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_per_user() {
        let store = store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let first = store.create(alice, new_conversation("ra-homesick")).await.unwrap();
        let second = store.create(alice, new_conversation("ta-failed-midterm")).await.unwrap();
        store.create(bob, new_conversation("ra-noise-complaint")).await.unwrap();

        let listed = store.list(alice).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].started_at >= listed[1].started_at);
        let ids: Vec<Uuid> = listed.iter().map(|c| c.id).collect();
        assert!(ids.contains(&first.id) && ids.contains(&second.id));

        assert_eq!(store.list(bob).await.unwrap().len(), 1);
        assert!(store.list(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_fields() {
        let store = store();
        let user = Uuid::new_v4();
        let created = store.create(user, new_conversation("ra-noise-complaint")).await.unwrap();

        let updated = store
            .update(
                user,
                created.id,
                UpdateConversation {
                    track_id: None,
                    scenario_id: None,
                    scenario_title: Some("Renamed".to_string()),
                    messages: Some(vec![Turn::coach("Let's touch base Friday.")]),
                    feedback: Some(sample_feedback()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.scenario_id, "ra-noise-complaint");
        assert_eq!(updated.track_id, "ra");
        assert_eq!(updated.scenario_title, "Renamed");
        assert_eq!(updated.messages.len(), 1);
        assert_eq!(updated.feedback, Some(sample_feedback()));
        assert_eq!(store.get(user, created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_out_of_range_feedback_is_rejected() {
        let store = store();
        let user = Uuid::new_v4();

        let mut bad_create = new_conversation("ra-homesick");
        bad_create.feedback = Some(Feedback {
            empathy: 200,
            ..sample_feedback()
        });
        assert!(matches!(
            store.create(user, bad_create).await,
            Err(AppError::Validation(_))
        ));
        assert!(store.list(user).await.unwrap().is_empty());

        let created = store.create(user, new_conversation("ra-homesick")).await.unwrap();
        let result = store
            .update(
                user,
                created.id,
                UpdateConversation {
                    track_id: None,
                    scenario_id: None,
                    scenario_title: None,
                    messages: Some(vec![Turn::coach("Thanks for sharing.")]),
                    feedback: Some(Feedback {
                        satisfaction: 77,
                        ..sample_feedback()
                    }),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.get(user, created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_requires_messages() {
        let store = store();
        let user = Uuid::new_v4();
        let created = store.create(user, new_conversation("ra-homesick")).await.unwrap();
        let result = store
            .update(
                user,
                created.id,
                UpdateConversation {
                    track_id: None,
                    scenario_id: None,
                    scenario_title: None,
                    messages: None,
                    feedback: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_other_users_conversation_is_not_found() {
        let store = store();
        let owner = Uuid::new_v4();
        let created = store.create(owner, new_conversation("ra-homesick")).await.unwrap();

        let intruder = Uuid::new_v4();
        assert!(matches!(
            store.get(intruder, created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(intruder, created.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_conversation() {
        let repo = Arc::new(InMemoryRepository::new());
        let store = ConversationStore::new(repo.clone());
        let user = Uuid::new_v4();
        let first = store.create(user, new_conversation("ra-homesick")).await.unwrap();
        let second = store.create(user, new_conversation("ra-roommate-conflict")).await.unwrap();

        store.delete(user, first.id).await.unwrap();
        assert_eq!(store.list(user).await.unwrap(), vec![second.clone()]);

        // last one out drops the key
        store.delete(user, second.id).await.unwrap();
        assert!(store.list(user).await.unwrap().is_empty());
        assert_eq!(repo.get(&key_for(user)).await.unwrap(), None);
    }
}
