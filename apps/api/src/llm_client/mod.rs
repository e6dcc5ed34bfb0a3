/// LLM client: the single point of entry for all text-generation calls.
///
/// ARCHITECTURAL RULE: No other module may talk to the model backend directly.
/// Scoring and persona replies go through the `TextGenerator` trait, which
/// `LlmClient` implements against an Ollama-compatible `/api/chat` endpoint.
///
/// One attempt per call. Callers own the fallback, so there is no retry loop here.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod prompts;

/// Reply locations tried in order. Ollama answers with `message.content`,
/// OpenAI-compatible servers with `choices[0].message.content`.
const REPLY_POINTERS: &[&str] = &["/message/content", "/choices/0/message/content"];

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Anything that can turn a chat history into a free-text reply.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>` so tests can swap in stubs.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: &'a [ChatMessage],
}

/// HTTP client for the chat backend.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model: model.to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        Self::new(
            &config.llm_base_url,
            &config.llm_model,
            Duration::from_secs(config.llm_timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends one non-streaming chat request and returns the reply text.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            stream: false,
            messages,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            warn!("LLM backend returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: Value = serde_json::from_str(&body)?;
        let reply = extract_reply(&envelope).ok_or(LlmError::EmptyContent)?;

        debug!(
            "LLM call succeeded: model={}, reply_chars={}",
            self.model,
            reply.chars().count()
        );

        Ok(reply.to_string())
    }

    fn classify(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(self.timeout)
        } else {
            LlmError::Http(err)
        }
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.chat(messages).await
    }
}

/// Pulls the reply text out of a response envelope, first matching rule wins.
pub fn extract_reply(envelope: &Value) -> Option<&str> {
    REPLY_POINTERS
        .iter()
        .filter_map(|pointer| envelope.pointer(pointer))
        .filter_map(Value::as_str)
        .find(|text| !text.trim().is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Scripted generator: pops one canned outcome per call and records the prompts it saw.
    pub struct StubGenerator {
        outcomes: Mutex<VecDeque<Result<String, LlmError>>>,
        pub seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl StubGenerator {
        pub fn new(outcomes: Vec<Result<String, LlmError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(text.to_string())])
        }

        pub fn failing(status: u16) -> Self {
            Self::new(vec![Err(LlmError::Api {
                status,
                message: "backend down".to_string(),
            })])
        }

        pub fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }
}
