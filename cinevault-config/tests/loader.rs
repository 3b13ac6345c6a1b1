use std::fs;
use std::time::Duration;

use anyhow::Result;
use cinevault_config::{
    ConfigGuardRailError, ConfigLoadError, ConfigLoader, ConfigSource,
    ConfigWarning, EnvConfig, StorageBackend,
};
use tempfile::TempDir;

fn empty_env() -> EnvConfig {
    EnvConfig::from_lookup(|_| None)
}

fn env_from(pairs: &'static [(&'static str, &'static str)]) -> EnvConfig {
    EnvConfig::from_lookup(move |key| {
        pairs
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
    })
}

#[test]
fn defaults_apply_without_file_or_env() -> Result<()> {
    let root = TempDir::new()?;
    let load = ConfigLoader::new()
        .with_search_root(root.path())
        .with_env(empty_env())
        .load()?;

    let config = load.config;
    assert_eq!(config.metadata.source, ConfigSource::Default);
    assert_eq!(config.session.token_expiry_buffer, Duration::from_secs(60));
    assert_eq!(config.biometric.max_attempts, 5);
    assert!(config.biometric.require_on_login);
    assert!(config.capture.enabled);
    assert_eq!(
        config.capture.devtools_poll_interval,
        Duration::from_millis(500)
    );
    assert_eq!(config.capture.devtools_threshold_px, 160);
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert!(load.warnings.is_empty());
    Ok(())
}

#[test]
fn default_candidate_file_is_discovered() -> Result<()> {
    let root = TempDir::new()?;
    fs::write(
        root.path().join("cinevault.toml"),
        r#"
[biometric]
max_attempts = 3
prompt_message = "Unlock CineVault"

[capture]
devtools_poll_interval = "250ms"
"#,
    )?;

    let load = ConfigLoader::new()
        .with_search_root(root.path())
        .with_env(empty_env())
        .load()?;

    assert!(matches!(load.config.metadata.source, ConfigSource::File(_)));
    assert_eq!(load.config.biometric.max_attempts, 3);
    assert_eq!(load.config.biometric.prompt_message, "Unlock CineVault");
    assert_eq!(
        load.config.capture.devtools_poll_interval,
        Duration::from_millis(250)
    );
    Ok(())
}

#[test]
fn env_overrides_file_values() -> Result<()> {
    let root = TempDir::new()?;
    let path = root.path().join("custom.json");
    fs::write(
        &path,
        r#"{"biometric": {"max_attempts": 3, "require_on_login": true}}"#,
    )?;

    let load = ConfigLoader::new()
        .with_config_path(&path)
        .with_env(env_from(&[
            ("CINEVAULT_BIOMETRIC_MAX_ATTEMPTS", "7"),
            ("CINEVAULT_BIOMETRIC_REQUIRE_ON_LOGIN", "off"),
            ("CINEVAULT_CAPTURE_PROTECTION", "no"),
        ]))
        .load()?;

    assert_eq!(load.config.metadata.source, ConfigSource::Explicit(path));
    assert_eq!(load.config.biometric.max_attempts, 7);
    assert!(!load.config.biometric.require_on_login);
    assert!(!load.config.capture.enabled);
    assert!(
        load.warnings
            .contains(&ConfigWarning::CaptureProtectionDisabled)
    );
    Ok(())
}

#[test]
fn zero_attempt_budget_is_rejected() -> Result<()> {
    let root = TempDir::new()?;
    let err = ConfigLoader::new()
        .with_search_root(root.path())
        .with_env(env_from(&[("CINEVAULT_BIOMETRIC_MAX_ATTEMPTS", "0")]))
        .load()
        .unwrap_err();

    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::ZeroBiometricAttempts)
    ));
    Ok(())
}

#[test]
fn malformed_env_value_reports_key() -> Result<()> {
    let root = TempDir::new()?;
    let err = ConfigLoader::new()
        .with_search_root(root.path())
        .with_env(env_from(&[("CINEVAULT_STORAGE", "cloud")]))
        .load()
        .unwrap_err();

    match err {
        ConfigLoadError::InvalidValue { key, value } => {
            assert_eq!(key, "CINEVAULT_STORAGE");
            assert_eq!(value, "cloud");
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn file_storage_without_path_warns() -> Result<()> {
    let root = TempDir::new()?;
    let load = ConfigLoader::new()
        .with_search_root(root.path())
        .with_env(env_from(&[("CINEVAULT_STORAGE", "file")]))
        .load()?;

    assert_eq!(load.config.storage.backend, StorageBackend::File);
    assert!(load.warnings.contains(&ConfigWarning::FileStorageWithoutPath));
    Ok(())
}
