pub mod sources;

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_BIOMETRIC_CANCEL_LABEL, DEFAULT_BIOMETRIC_ENABLE_PROMPT,
    DEFAULT_BIOMETRIC_PROMPT,
    DEFAULT_DEVTOOLS_POLL_INTERVAL, DEFAULT_DEVTOOLS_THRESHOLD_PX,
    DEFAULT_MAX_BIOMETRIC_ATTEMPTS, DEFAULT_REMOTE_LOGOUT_TIMEOUT,
    DEFAULT_TOKEN_EXPIRY_BUFFER,
};

/// Effective configuration for the session gating core.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub session: SessionConfig,
    pub biometric: BiometricConfig,
    pub capture: CaptureConfig,
    pub storage: StorageConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Stored tokens with less than this much lifetime left are discarded
    /// during hydration instead of being restored.
    pub token_expiry_buffer: Duration,
    /// Upper bound for the fire-and-forget remote logout call.
    pub remote_logout_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_expiry_buffer: DEFAULT_TOKEN_EXPIRY_BUFFER,
            remote_logout_timeout: DEFAULT_REMOTE_LOGOUT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BiometricConfig {
    /// Default for the user's "require biometrics on login" preference,
    /// used until the user has saved one.
    pub require_on_login: bool,
    /// Failed challenges allowed before the gate stops prompting and only
    /// offers logout.
    pub max_attempts: u32,
    pub prompt_message: String,
    /// Shown by the confirmation prompt when biometrics are switched on.
    pub enable_prompt_message: String,
    pub cancel_label: String,
}

impl Default for BiometricConfig {
    fn default() -> Self {
        Self {
            require_on_login: true,
            max_attempts: DEFAULT_MAX_BIOMETRIC_ATTEMPTS,
            prompt_message: DEFAULT_BIOMETRIC_PROMPT.to_string(),
            enable_prompt_message: DEFAULT_BIOMETRIC_ENABLE_PROMPT.to_string(),
            cancel_label: DEFAULT_BIOMETRIC_CANCEL_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub enabled: bool,
    pub devtools_poll_interval: Duration,
    /// Outer minus inner window size (px) above which devtools are assumed
    /// to be docked open.
    pub devtools_threshold_px: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            devtools_poll_interval: DEFAULT_DEVTOOLS_POLL_INTERVAL,
            devtools_threshold_px: DEFAULT_DEVTOOLS_THRESHOLD_PX,
        }
    }
}

/// Where tokens and biometric preferences are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Lost on restart.
    #[default]
    Memory,
    /// JSON file in the platform data directory (or `StorageConfig::path`).
    File,
}

impl StorageBackend {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Some(StorageBackend::Memory),
            "file" | "disk" => Some(StorageBackend::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: Option<PathBuf>,
}

/// Which layer produced the file portion of the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    Explicit(PathBuf),
    File(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub source: ConfigSource,
    pub env_file_loaded: bool,
}

impl ConfigMetadata {
    pub fn config_path(&self) -> Option<&PathBuf> {
        match &self.source {
            ConfigSource::Default => None,
            ConfigSource::EnvPath(path)
            | ConfigSource::Explicit(path)
            | ConfigSource::File(path) => Some(path),
        }
    }
}
