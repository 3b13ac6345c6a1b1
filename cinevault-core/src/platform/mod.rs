//! Platform capability seams
//!
//! Everything the gating core needs from the outside world goes through one
//! of these traits: persisted credentials, the auth backend, the biometric
//! sensor, the screen capture primitive, navigation and (on the web) the
//! document. Each comes with an in-process implementation used by tests and
//! by `cinevaultctl`.

pub mod auth_api;
pub mod biometric;
pub mod capture;
pub mod credentials;
pub mod document;
pub mod navigation;

use std::sync::Arc;

pub use auth_api::{AuthApi, MockAuthApi};
pub use biometric::{
    BiometricPrompt, BiometryKind, PromptOutcome, PromptRequest,
    SensorAvailability, SimulatedBiometricPrompt,
};
pub use capture::{CaptureOutcome, ScreenCapture, SimulatedScreenCapture};
pub use credentials::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, credential_store,
};
pub use document::{DocumentHooks, KeyChord, KeyFilter, SimulatedDocument, WindowMetrics};
pub use navigation::{Navigator, RecordingNavigator};

/// The full set of capabilities handed to [`crate::app::AppContext`].
#[derive(Clone)]
pub struct Platform {
    pub credentials: Arc<dyn CredentialStore>,
    pub auth_api: Arc<dyn AuthApi>,
    pub biometric: Arc<dyn BiometricPrompt>,
    pub capture: Arc<dyn ScreenCapture>,
    pub navigator: Arc<dyn Navigator>,
    /// Only present on web builds, where capture protection degrades to
    /// advisory document hooks.
    pub document: Option<Arc<dyn DocumentHooks>>,
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("credentials", &"CredentialStore(..)")
            .field("auth_api", &"AuthApi(..)")
            .field("biometric", &"BiometricPrompt(..)")
            .field("capture", &"ScreenCapture(..)")
            .field("navigator", &"Navigator(..)")
            .field("document", &self.document.as_ref().map(|_| "DocumentHooks(..)"))
            .finish()
    }
}
