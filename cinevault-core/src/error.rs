//! Error types for the session gating core
//!
//! Each subsystem gets its own taxonomy so callers can decide what is shown
//! to the user: auth errors go to the auth screen, biometric errors to the
//! step-up screen, capture errors never leave the guard.

use cinevault_model::ModelError;
use thiserror::Error;

/// Authentication and session errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password rejected by the backend
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Backend could not be reached
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Refresh token rejected or session revoked server-side
    #[error("Session expired")]
    SessionExpired,

    /// Persisted credentials could not be read or written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Operation requires an authenticated session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Registration for an email that already has an account
    #[error("Account already exists: {0}")]
    AccountExists(String),

    /// Input rejected before reaching the backend
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Network-related errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Connection timeout")]
    Timeout,

    #[error("Server unavailable")]
    ServerUnavailable,
}

/// Credential storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to read from storage")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write to storage")]
    WriteFailed(#[source] std::io::Error),

    #[error("Corrupted storage data: {0}")]
    CorruptedData(String),
}

/// Biometric step-up errors
#[derive(Debug, Error)]
pub enum BiometricError {
    /// No sensor, nothing enrolled, or the platform refused to prompt
    #[error("Biometric authentication unavailable")]
    Unavailable,

    /// The sensor did not recognise the user
    #[error("Biometric authentication denied")]
    Denied,

    /// The user dismissed the prompt, or the caller went away mid-prompt
    #[error("Biometric authentication cancelled")]
    Cancelled,

    /// Retry budget spent; only logout is offered from here
    #[error("Biometric authentication locked after {attempts} failed attempts")]
    AttemptsExhausted { attempts: u32 },

    /// Step-up only makes sense on top of a session
    #[error("Biometric authentication requires a signed-in session")]
    NotAuthenticated,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Screen capture protection errors. Always swallowed by the capture guard.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Screen capture protection is not supported on this platform")]
    PlatformUnsupported,

    #[error("Permission to change screen capture policy was denied")]
    PermissionDenied,

    #[error("Screen capture platform error: {0}")]
    Platform(String),
}

/// Errors from the in-memory library collaborators
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LibraryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Invalid fixture data: {0}")]
    Fixture(String),
}

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Result type alias for biometric operations
pub type BiometricResult<T> = Result<T, BiometricError>;

/// Result type alias for library operations
pub type LibraryResult<T> = Result<T, LibraryError>;

/// Convert from serde_json errors
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::CorruptedData(err.to_string())
    }
}
