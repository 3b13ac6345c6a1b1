use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    ENV_BIOMETRIC_MAX_ATTEMPTS, ENV_BIOMETRIC_REQUIRE_ON_LOGIN,
    ENV_CAPTURE_ENABLED, ENV_CONFIG_PATH, ENV_DEVTOOLS_POLL_INTERVAL, ENV_DEVTOOLS_THRESHOLD_PX,
    ENV_REMOTE_LOGOUT_TIMEOUT, ENV_STORAGE_BACKEND, ENV_STORAGE_PATH,
    ENV_TOKEN_EXPIRY_BUFFER,
};
use crate::util::non_blank;

/// Raw configuration as defined in a TOML or JSON file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub session: FileSessionConfig,
    #[serde(default)]
    pub biometric: FileBiometricConfig,
    #[serde(default)]
    pub capture: FileCaptureConfig,
    #[serde(default)]
    pub storage: FileStorageConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileSessionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expiry_buffer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_logout_timeout: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileBiometricConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_on_login: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_prompt_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_label: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCaptureConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devtools_poll_interval: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devtools_threshold_px: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Raw environment overrides, unparsed.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub token_expiry_buffer: Option<String>,
    pub remote_logout_timeout: Option<String>,
    pub biometric_require_on_login: Option<String>,
    pub biometric_max_attempts: Option<String>,
    pub capture_enabled: Option<String>,
    pub devtools_poll_interval: Option<String>,
    pub devtools_threshold_px: Option<String>,
    pub storage_backend: Option<String>,
    pub storage_path: Option<PathBuf>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so callers (and tests) do not have
    /// to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(lookup(key));
        Self {
            config_path: get(ENV_CONFIG_PATH).map(PathBuf::from),
            token_expiry_buffer: get(ENV_TOKEN_EXPIRY_BUFFER),
            remote_logout_timeout: get(ENV_REMOTE_LOGOUT_TIMEOUT),
            biometric_require_on_login: get(ENV_BIOMETRIC_REQUIRE_ON_LOGIN),
            biometric_max_attempts: get(ENV_BIOMETRIC_MAX_ATTEMPTS),
            capture_enabled: get(ENV_CAPTURE_ENABLED),
            devtools_poll_interval: get(ENV_DEVTOOLS_POLL_INTERVAL),
            devtools_threshold_px: get(ENV_DEVTOOLS_THRESHOLD_PX),
            storage_backend: get(ENV_STORAGE_BACKEND),
            storage_path: get(ENV_STORAGE_PATH).map(PathBuf::from),
        }
    }
}
