//! Shared configuration library for CineVault.
//!
//! Centralizes config defaults, file/env layering and guard-rail validation
//! for the session gating core. Both `cinevault-core` and `cinevaultctl`
//! consume [`Config`] from here so there is a single source of truth for
//! timeouts, attempt budgets and capture-protection tuning.

pub mod constants;
pub mod loader;
pub mod models;
pub mod util;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    BiometricConfig, CaptureConfig, Config, ConfigMetadata, ConfigSource,
    SessionConfig, StorageBackend, StorageConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
