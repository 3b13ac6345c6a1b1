pub mod error;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::constants::{
    DEFAULT_CONFIG_CANDIDATES, ENV_BIOMETRIC_MAX_ATTEMPTS,
    ENV_BIOMETRIC_REQUIRE_ON_LOGIN, ENV_CAPTURE_ENABLED,
    ENV_DEVTOOLS_POLL_INTERVAL, ENV_DEVTOOLS_THRESHOLD_PX,
    ENV_REMOTE_LOGOUT_TIMEOUT, ENV_STORAGE_BACKEND, ENV_TOKEN_EXPIRY_BUFFER,
};
use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::{Config, ConfigMetadata, ConfigSource, StorageBackend};
use crate::util::{parse_bool, parse_duration};
use crate::validation::{ConfigWarnings, validate_config};
use error::ConfigLoadError;

/// Result of a successful load: the effective config plus any non-fatal
/// warnings raised by validation.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

/// Composes defaults, an optional config file and environment overrides.
///
/// Precedence, lowest to highest: built-in defaults, file, environment.
/// The file is chosen from (in order) an explicit path,
/// `$CINEVAULT_CONFIG_PATH`, or the first default candidate that exists
/// under the search root.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
    search_root: Option<PathBuf>,
    env: Option<EnvConfig>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Load `KEY=value` pairs from a dotenv file into the process
    /// environment before gathering overrides.
    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn with_search_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.search_root = Some(root.into());
        self
    }

    /// Use the given overrides instead of reading the process environment.
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = Some(env);
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|source| {
                    ConfigLoadError::EnvFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                debug!(path = %path.display(), "loaded env file");
                true
            }
            None => false,
        };

        let env = self.env.clone().unwrap_or_else(EnvConfig::gather);

        let (file, source) = match self.resolve_file(&env) {
            Some((path, source)) => (read_file_config(&path)?, source),
            None => (FileConfig::default(), ConfigSource::Default),
        };

        let mut config = Config {
            metadata: ConfigMetadata {
                source,
                env_file_loaded,
            },
            ..Config::default()
        };

        apply_file(&mut config, &file)?;
        apply_env(&mut config, &env)?;

        let warnings = validate_config(&config)?;
        for warning in warnings.iter() {
            tracing::warn!(%warning, "configuration warning");
        }

        info!(
            source = ?config.metadata.source,
            storage = ?config.storage.backend,
            capture = config.capture.enabled,
            "configuration loaded"
        );

        Ok(ConfigLoad { config, warnings })
    }

    fn resolve_file(&self, env: &EnvConfig) -> Option<(PathBuf, ConfigSource)> {
        if let Some(path) = &self.config_path {
            return Some((path.clone(), ConfigSource::Explicit(path.clone())));
        }
        if let Some(path) = &env.config_path {
            return Some((path.clone(), ConfigSource::EnvPath(path.clone())));
        }

        let root = self
            .search_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        DEFAULT_CONFIG_CANDIDATES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.exists())
            .map(|path| (path.clone(), ConfigSource::File(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    parse_file_config(&contents, path)
}

fn parse_file_config(
    contents: &str,
    path: &Path,
) -> Result<FileConfig, ConfigLoadError> {
    let parse_err = |message: String| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        message,
    };

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => {
            serde_json::from_str(contents).map_err(|err| parse_err(err.to_string()))
        }
        Some("toml") | Some("tml") => {
            toml::from_str(contents).map_err(|err| parse_err(err.to_string()))
        }
        // Try TOML first, then JSON for convenience.
        _ => toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                parse_err(format!(
                    "toml error: {toml_err}; json error: {json_err}"
                ))
            })
        }),
    }
}

fn duration_value(
    key: &'static str,
    raw: &str,
) -> Result<Duration, ConfigLoadError> {
    parse_duration(raw).ok_or_else(|| ConfigLoadError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn bool_value(key: &'static str, raw: &str) -> Result<bool, ConfigLoadError> {
    parse_bool(raw).ok_or_else(|| ConfigLoadError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn u32_value(key: &'static str, raw: &str) -> Result<u32, ConfigLoadError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigLoadError::InvalidValue {
            key,
            value: raw.to_string(),
        })
}

fn backend_value(
    key: &'static str,
    raw: &str,
) -> Result<StorageBackend, ConfigLoadError> {
    StorageBackend::parse(raw).ok_or_else(|| ConfigLoadError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn apply_file(
    config: &mut Config,
    file: &FileConfig,
) -> Result<(), ConfigLoadError> {
    if let Some(raw) = &file.session.token_expiry_buffer {
        config.session.token_expiry_buffer =
            duration_value("session.token_expiry_buffer", raw)?;
    }
    if let Some(raw) = &file.session.remote_logout_timeout {
        config.session.remote_logout_timeout =
            duration_value("session.remote_logout_timeout", raw)?;
    }

    let biometric = &file.biometric;
    if let Some(value) = biometric.require_on_login {
        config.biometric.require_on_login = value;
    }
    if let Some(value) = biometric.max_attempts {
        config.biometric.max_attempts = value;
    }
    if let Some(value) = &biometric.prompt_message {
        config.biometric.prompt_message = value.clone();
    }
    if let Some(value) = &biometric.enable_prompt_message {
        config.biometric.enable_prompt_message = value.clone();
    }
    if let Some(value) = &biometric.cancel_label {
        config.biometric.cancel_label = value.clone();
    }

    let capture = &file.capture;
    if let Some(value) = capture.enabled {
        config.capture.enabled = value;
    }
    if let Some(raw) = &capture.devtools_poll_interval {
        config.capture.devtools_poll_interval =
            duration_value("capture.devtools_poll_interval", raw)?;
    }
    if let Some(value) = capture.devtools_threshold_px {
        config.capture.devtools_threshold_px = value;
    }

    if let Some(raw) = &file.storage.backend {
        config.storage.backend = backend_value("storage.backend", raw)?;
    }
    if let Some(path) = &file.storage.path {
        config.storage.path = Some(path.clone());
    }

    Ok(())
}

fn apply_env(
    config: &mut Config,
    env: &EnvConfig,
) -> Result<(), ConfigLoadError> {
    if let Some(raw) = &env.token_expiry_buffer {
        config.session.token_expiry_buffer =
            duration_value(ENV_TOKEN_EXPIRY_BUFFER, raw)?;
    }
    if let Some(raw) = &env.remote_logout_timeout {
        config.session.remote_logout_timeout =
            duration_value(ENV_REMOTE_LOGOUT_TIMEOUT, raw)?;
    }
    if let Some(raw) = &env.biometric_require_on_login {
        config.biometric.require_on_login =
            bool_value(ENV_BIOMETRIC_REQUIRE_ON_LOGIN, raw)?;
    }
    if let Some(raw) = &env.biometric_max_attempts {
        config.biometric.max_attempts =
            u32_value(ENV_BIOMETRIC_MAX_ATTEMPTS, raw)?;
    }
    if let Some(raw) = &env.capture_enabled {
        config.capture.enabled = bool_value(ENV_CAPTURE_ENABLED, raw)?;
    }
    if let Some(raw) = &env.devtools_poll_interval {
        config.capture.devtools_poll_interval =
            duration_value(ENV_DEVTOOLS_POLL_INTERVAL, raw)?;
    }
    if let Some(raw) = &env.devtools_threshold_px {
        config.capture.devtools_threshold_px =
            u32_value(ENV_DEVTOOLS_THRESHOLD_PX, raw)?;
    }
    if let Some(raw) = &env.storage_backend {
        config.storage.backend = backend_value(ENV_STORAGE_BACKEND, raw)?;
    }
    if let Some(path) = &env.storage_path {
        config.storage.path = Some(path.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensionless_files_fall_back_to_json() {
        let parsed = parse_file_config(
            r#"{"biometric": {"max_attempts": 2}}"#,
            Path::new("cinevault.conf"),
        )
        .expect("json fallback");
        assert_eq!(parsed.biometric.max_attempts, Some(2));
    }

    #[test]
    fn invalid_duration_names_the_key() {
        let err = duration_value("session.token_expiry_buffer", "forever")
            .unwrap_err();
        assert!(err.to_string().contains("session.token_expiry_buffer"));
    }
}
