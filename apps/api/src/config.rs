use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_LLM_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_LLM_MODEL: &str = "llama3";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Ollama-compatible chat backend.
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    /// When false, `/evaluate` goes straight to the heuristic scorer.
    pub enable_model_scoring: bool,
    /// When false, `/chat` always answers with the canned persona reply.
    pub enable_model_chat: bool,
    /// Directory for the file-backed repository. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            llm_base_url: lookup("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_LLM_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            llm_model: lookup("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout_secs: parse_timeout(&lookup)?,
            enable_model_scoring: parse_flag(&lookup, "ENABLE_MODEL_SCORING", true)?,
            enable_model_chat: parse_flag(&lookup, "ENABLE_MODEL_CHAT", true)?,
            data_dir: lookup("DATA_DIR")
                .filter(|d| !d.trim().is_empty())
                .map(PathBuf::from),
            port: parse_or(&lookup, "PORT", 8080)
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}

/// A zero timeout would fail every model call, so it is refused at startup.
fn parse_timeout<F>(lookup: &F) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = parse_or(lookup, "LLM_TIMEOUT_SECS", 30)?;
    if secs == 0 {
        anyhow::bail!("Environment variable 'LLM_TIMEOUT_SECS' must be at least 1");
    }
    Ok(secs)
}

fn parse_flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => anyhow::bail!("Environment variable '{key}' must be a boolean, got '{raw}'"),
    }
}
