//! Persisted credentials: the session token and the biometric preferences.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinevault_config::{StorageBackend, StorageConfig};
use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::session::credential::AuthToken;

const CREDENTIALS_FILE: &str = "credentials.json";
const STORAGE_VERSION: u32 = 1;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load_token(&self) -> Result<Option<AuthToken>, StorageError>;

    async fn save_token(&self, token: &AuthToken) -> Result<(), StorageError>;

    async fn clear_token(&self) -> Result<(), StorageError>;

    async fn load_biometric_enabled(&self) -> Result<bool, StorageError>;

    async fn save_biometric_enabled(&self, enabled: bool) -> Result<(), StorageError>;

    /// The user's "require biometrics on login" choice, `None` until one
    /// has been saved.
    async fn load_biometric_required(&self) -> Result<Option<bool>, StorageError>;

    async fn save_biometric_required(&self, required: bool) -> Result<(), StorageError>;
}

/// Build the store selected by `config`.
pub fn credential_store(config: &StorageConfig) -> Result<Arc<dyn CredentialStore>, StorageError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryCredentialStore::new())),
        StorageBackend::File => {
            let store = match &config.path {
                Some(path) => FileCredentialStore::new(path),
                None => FileCredentialStore::in_data_dir()?,
            };
            debug!(path = %store.path().display(), "using file credential store");
            Ok(Arc::new(store))
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default)]
    version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<AuthToken>,
    #[serde(default)]
    biometric_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    biometric_required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

/// Process-local store. State is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<StoredCredentials>,
    fail_io: Mutex<bool>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate as if a previous run had logged in.
    pub fn with_token(token: AuthToken) -> Self {
        let store = Self::default();
        store.inner.lock().token = Some(token);
        store
    }

    pub fn set_biometric_enabled(&self, enabled: bool) {
        self.inner.lock().biometric_enabled = enabled;
    }

    pub fn set_biometric_required(&self, required: bool) {
        self.inner.lock().biometric_required = Some(required);
    }

    /// Make every subsequent call fail, to exercise storage error paths.
    pub fn set_failing(&self, failing: bool) {
        *self.fail_io.lock() = failing;
    }

    pub fn stored_token(&self) -> Option<AuthToken> {
        self.inner.lock().token.clone()
    }

    fn check(&self) -> Result<(), StorageError> {
        if *self.fail_io.lock() {
            return Err(StorageError::Unavailable(
                "memory store set to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load_token(&self) -> Result<Option<AuthToken>, StorageError> {
        self.check()?;
        Ok(self.inner.lock().token.clone())
    }

    async fn save_token(&self, token: &AuthToken) -> Result<(), StorageError> {
        self.check()?;
        let mut inner = self.inner.lock();
        inner.token = Some(token.clone());
        inner.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn clear_token(&self) -> Result<(), StorageError> {
        self.check()?;
        self.inner.lock().token = None;
        Ok(())
    }

    async fn load_biometric_enabled(&self) -> Result<bool, StorageError> {
        self.check()?;
        Ok(self.inner.lock().biometric_enabled)
    }

    async fn save_biometric_enabled(&self, enabled: bool) -> Result<(), StorageError> {
        self.check()?;
        self.inner.lock().biometric_enabled = enabled;
        Ok(())
    }

    async fn load_biometric_required(&self) -> Result<Option<bool>, StorageError> {
        self.check()?;
        Ok(self.inner.lock().biometric_required)
    }

    async fn save_biometric_required(&self, required: bool) -> Result<(), StorageError> {
        self.check()?;
        self.inner.lock().biometric_required = Some(required);
        Ok(())
    }
}

/// JSON file store, by default under the platform data directory.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serialises read-modify-write cycles on the file.
    write_lock: tokio::sync::Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Store in the per-user data directory for CineVault.
    pub fn in_data_dir() -> Result<Self, StorageError> {
        let dirs = ProjectDirs::from("", "cinevault", "cinevault").ok_or_else(|| {
            StorageError::Unavailable("Unable to determine data directory".to_string())
        })?;
        Ok(Self::new(dirs.data_dir().join(CREDENTIALS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<StoredCredentials, StorageError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let stored: StoredCredentials = serde_json::from_str(&content)?;
                if stored.version > STORAGE_VERSION {
                    return Err(StorageError::CorruptedData(format!(
                        "unsupported credentials version {}",
                        stored.version
                    )));
                }
                Ok(stored)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(StoredCredentials::default())
            }
            Err(err) => Err(StorageError::ReadFailed(err)),
        }
    }

    async fn write(&self, mut stored: StoredCredentials) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(StorageError::WriteFailed)?;
        }
        stored.version = STORAGE_VERSION;
        stored.updated_at = Some(Utc::now());
        let content = serde_json::to_string_pretty(&stored)?;

        // Write to a sibling then rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(StorageError::WriteFailed)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(StorageError::WriteFailed)?;
        debug!(path = %self.path.display(), "credentials written");
        Ok(())
    }

    /// Read-modify-write. A file that no longer parses is replaced rather
    /// than blocking every later write; reads keep reporting it.
    async fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut StoredCredentials) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut stored = match self.read().await {
            Ok(stored) => stored,
            Err(StorageError::CorruptedData(reason)) => {
                warn!(
                    path = %self.path.display(),
                    %reason,
                    "credentials file unreadable, replacing it"
                );
                StoredCredentials::default()
            }
            Err(err) => return Err(err),
        };
        f(&mut stored);
        self.write(stored).await
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load_token(&self) -> Result<Option<AuthToken>, StorageError> {
        Ok(self.read().await?.token)
    }

    async fn save_token(&self, token: &AuthToken) -> Result<(), StorageError> {
        let token = token.clone();
        self.update(move |stored| stored.token = Some(token)).await
    }

    async fn clear_token(&self) -> Result<(), StorageError> {
        self.update(|stored| stored.token = None).await
    }

    async fn load_biometric_enabled(&self) -> Result<bool, StorageError> {
        Ok(self.read().await?.biometric_enabled)
    }

    async fn save_biometric_enabled(&self, enabled: bool) -> Result<(), StorageError> {
        self.update(move |stored| stored.biometric_enabled = enabled)
            .await
    }

    async fn load_biometric_required(&self) -> Result<Option<bool>, StorageError> {
        Ok(self.read().await?.biometric_required)
    }

    async fn save_biometric_required(&self, required: bool) -> Result<(), StorageError> {
        self.update(move |stored| stored.biometric_required = Some(required))
            .await
    }
}
