//! Credential persistence.
//!
//! The access token lives outside the in-memory store, in a key/value
//! medium behind [`TokenStorage`]. Only the session path of the runner
//! writes it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::claims::{self, Claims};
use crate::error::{StorageError, TokenError};

/// Storage key of the persisted access token.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Key/value medium for persisted credentials.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: DashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

#[async_trait]
impl TokenStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reads and writes the access token through a [`TokenStorage`].
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn TokenStorage>,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub async fn save(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, token).await
    }

    /// Raw token, if one is persisted. An unreadable medium counts as empty.
    pub async fn load(&self) -> Option<String> {
        match self.storage.get(ACCESS_TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted token");
                None
            }
        }
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(ACCESS_TOKEN_KEY).await
    }

    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        claims::decode_token(token)
    }

    /// Load the persisted token and require it to be decodable and unexpired.
    ///
    /// Anything else clears the token: a session is either fully valid or
    /// absent.
    pub async fn restore(&self, now: DateTime<Utc>) -> Option<(String, Claims)> {
        let token = self.load().await?;

        match claims::decode_valid_token(&token, now) {
            Ok(claims) => {
                debug!(user_id = ?claims.user_id, "Restored persisted session");
                Some((token, claims))
            }
            Err(e) => {
                warn!(error = %e, "Discarding persisted token");
                if let Err(e) = self.clear().await {
                    warn!(error = %e, "Failed to clear discarded token");
                }
                None
            }
        }
    }
}
