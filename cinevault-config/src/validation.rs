use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::models::{Config, StorageBackend};

const MAX_REASONABLE_EXPIRY_BUFFER: Duration = Duration::from_secs(60 * 60);

/// Configuration that would leave the gate unusable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("biometric.max_attempts must be at least 1")]
    ZeroBiometricAttempts,
    #[error("capture.devtools_poll_interval must be non-zero")]
    ZeroPollInterval,
    #[error("capture.devtools_threshold_px must be non-zero")]
    ZeroDevtoolsThreshold,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    CaptureProtectionDisabled,
    LargeExpiryBuffer(Duration),
    FileStorageWithoutPath,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::CaptureProtectionDisabled => {
                write!(f, "screen capture protection is disabled")
            }
            ConfigWarning::LargeExpiryBuffer(buffer) => write!(
                f,
                "token expiry buffer of {}s discards most stored sessions",
                buffer.as_secs()
            ),
            ConfigWarning::FileStorageWithoutPath => write!(
                f,
                "file storage selected without a path; using the platform data directory"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigWarnings(Vec<ConfigWarning>);

impl ConfigWarnings {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.0.iter()
    }

    pub fn contains(&self, warning: &ConfigWarning) -> bool {
        self.0.contains(warning)
    }
}

pub fn validate_config(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    if config.biometric.max_attempts == 0 {
        return Err(ConfigGuardRailError::ZeroBiometricAttempts);
    }
    if config.capture.devtools_poll_interval.is_zero() {
        return Err(ConfigGuardRailError::ZeroPollInterval);
    }
    if config.capture.devtools_threshold_px == 0 {
        return Err(ConfigGuardRailError::ZeroDevtoolsThreshold);
    }

    let mut warnings = Vec::new();
    if !config.capture.enabled {
        warnings.push(ConfigWarning::CaptureProtectionDisabled);
    }
    if config.session.token_expiry_buffer > MAX_REASONABLE_EXPIRY_BUFFER {
        warnings.push(ConfigWarning::LargeExpiryBuffer(
            config.session.token_expiry_buffer,
        ));
    }
    if config.storage.backend == StorageBackend::File
        && config.storage.path.is_none()
    {
        warnings.push(ConfigWarning::FileStorageWithoutPath);
    }

    Ok(ConfigWarnings(warnings))
}
