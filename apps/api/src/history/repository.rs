//! Key/value repository for user data (conversation history, custom scenarios).
//!
//! Stores speak JSON values; the typed helpers at the bottom do the serde work.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait Repository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError>;

    async fn put(&self, key: &str, value: Value) -> Result<(), RepositoryError>;

    /// Returns whether a value was present.
    async fn delete(&self, key: &str) -> Result<bool, RepositoryError>;
}

/// Process-local storage. Contents vanish on restart.
#[derive(Default)]
pub struct InMemoryRepository {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), RepositoryError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

/// One pretty-printed JSON file per key under a data directory.
pub struct FileRepository {
    root: PathBuf,
}

impl FileRepository {
    /// Creates the directory if it does not exist yet.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| RepositoryError::Io {
                path: root.clone(),
                source,
            })?;
        info!("File repository opened at {}", root.display());
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(key)))
    }
}

/// Keys may contain `:` and `/`; file names keep only `[A-Za-z0-9_-]`.
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn io_error(path: &Path, source: std::io::Error) -> RepositoryError {
    RepositoryError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl Repository for FileRepository {
    async fn get(&self, key: &str) -> Result<Option<Value>, RepositoryError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn put(&self, key: &str, value: Value) -> Result<(), RepositoryError> {
        let path = self.path_for(key);
        let bytes = serde_json::to_vec_pretty(&value)?;
        // Write-then-rename so readers never see a half-written file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, RepositoryError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

/// Reads a typed value, `None` when the key is absent.
pub async fn get_json<T: DeserializeOwned>(
    repo: &dyn Repository,
    key: &str,
) -> Result<Option<T>, RepositoryError> {
    match repo.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

pub async fn put_json<T: Serialize + Sync + ?Sized>(
    repo: &dyn Repository,
    key: &str,
    value: &T,
) -> Result<(), RepositoryError> {
    repo.put(key, serde_json::to_value(value)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn exercise(repo: &dyn Repository) {
        assert_eq!(repo.get("history:alice").await.unwrap(), None);

        repo.put("history:alice", json!([{"id": 1}])).await.unwrap();
        assert_eq!(
            repo.get("history:alice").await.unwrap(),
            Some(json!([{"id": 1}]))
        );

        repo.put("history:alice", json!([])).await.unwrap();
        assert_eq!(repo.get("history:alice").await.unwrap(), Some(json!([])));

        assert!(repo.delete("history:alice").await.unwrap());
        assert!(!repo.delete("history:alice").await.unwrap());
        assert_eq!(repo.get("history:alice").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_in_memory_repository_round_trip() {
        exercise(&InMemoryRepository::new()).await;
    }

    #[tokio::test]
    async fn test_file_repository_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(dir.path().join("data")).await.unwrap();
        exercise(&repo).await;
    }

    #[tokio::test]
    async fn test_file_repository_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let repo = FileRepository::open(dir.path()).await.unwrap();
            repo.put("custom-scenarios:bob", json!({"k": "v"})).await.unwrap();
        }
        let reopened = FileRepository::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get("custom-scenarios:bob").await.unwrap(),
            Some(json!({"k": "v"}))
        );
    }

    #[tokio::test]
    async fn test_file_repository_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRepository::open(dir.path()).await.unwrap();
        tokio::fs::write(repo.path_for("broken"), b"{not json")
            .await
            .unwrap();
        assert!(matches!(
            repo.get("broken").await,
            Err(RepositoryError::Serialization(_))
        ));
    }

    #[test]
    fn test_file_stem_sanitizes_keys() {
        assert_eq!(
            file_stem("history:0b6f/../x"),
            "history_0b6f____x"
        );
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let repo = InMemoryRepository::new();
        put_json(&repo, "nums", &vec![1, 2, 3]).await.unwrap();
        let nums: Option<Vec<i32>> = get_json(&repo, "nums").await.unwrap();
        assert_eq!(nums, Some(vec![1, 2, 3]));
        let missing: Option<Vec<i32>> = get_json(&repo, "other").await.unwrap();
        assert_eq!(missing, None);
    }
}
