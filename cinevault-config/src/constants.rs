//! Default values and environment keys.

use std::time::Duration;

pub const DEFAULT_TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);
pub const DEFAULT_REMOTE_LOGOUT_TIMEOUT: Duration = Duration::from_secs(2);

pub const DEFAULT_MAX_BIOMETRIC_ATTEMPTS: u32 = 5;
pub const DEFAULT_BIOMETRIC_PROMPT: &str = "Authenticate to access the app";
pub const DEFAULT_BIOMETRIC_CANCEL_LABEL: &str = "Cancel";
pub const DEFAULT_BIOMETRIC_ENABLE_PROMPT: &str = "Authenticate to enable biometric login";

pub const DEFAULT_DEVTOOLS_POLL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_DEVTOOLS_THRESHOLD_PX: u32 = 160;

pub const DEFAULT_CONFIG_CANDIDATES: &[&str] = &[
    "cinevault.toml",
    "cinevault.json",
    "config/cinevault.toml",
    "config/cinevault.json",
];

pub const ENV_CONFIG_PATH: &str = "CINEVAULT_CONFIG_PATH";
pub const ENV_TOKEN_EXPIRY_BUFFER: &str = "CINEVAULT_TOKEN_EXPIRY_BUFFER";
pub const ENV_REMOTE_LOGOUT_TIMEOUT: &str = "CINEVAULT_REMOTE_LOGOUT_TIMEOUT";
pub const ENV_BIOMETRIC_REQUIRE_ON_LOGIN: &str =
    "CINEVAULT_BIOMETRIC_REQUIRE_ON_LOGIN";
pub const ENV_BIOMETRIC_MAX_ATTEMPTS: &str = "CINEVAULT_BIOMETRIC_MAX_ATTEMPTS";
pub const ENV_CAPTURE_ENABLED: &str = "CINEVAULT_CAPTURE_PROTECTION";
pub const ENV_DEVTOOLS_POLL_INTERVAL: &str = "CINEVAULT_DEVTOOLS_POLL_INTERVAL";
pub const ENV_DEVTOOLS_THRESHOLD_PX: &str = "CINEVAULT_DEVTOOLS_THRESHOLD_PX";
pub const ENV_STORAGE_BACKEND: &str = "CINEVAULT_STORAGE";
pub const ENV_STORAGE_PATH: &str = "CINEVAULT_STORAGE_PATH";
