//! Application context
//!
//! Wires the gate state, session store, biometric gate, redirector and
//! capture guard around one set of platform capabilities. Exactly one
//! [`GateStateStore`] exists per context; it is created here and closed by
//! [`AppContext::teardown`].

use std::sync::Arc;

use anyhow::Context;
use cinevault_config::Config;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::biometric::BiometricGate;
use crate::capture::{CaptureGuard, CaptureScope};
use crate::error::AuthResult;
use crate::library::Library;
use crate::platform::Platform;
use crate::redirect::{AuthRedirector, RedirectReport};
use crate::session::{GateSnapshot, GateStateStore, HydrateOutcome, SessionStore};

pub struct AppContext {
    config: Config,
    state: GateStateStore,
    session: SessionStore,
    biometric: BiometricGate,
    capture: CaptureGuard,
    library: Arc<Library>,
    cancel: CancellationToken,
    redirector: Mutex<Option<AuthRedirector>>,
    redirector_task: Mutex<Option<JoinHandle<()>>>,
    redirects: watch::Receiver<RedirectReport>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("state", &self.state.current())
            .field("capture", &self.capture)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build every component. Nothing runs until [`AppContext::boot`].
    pub fn init(config: Config, platform: Platform) -> anyhow::Result<Self> {
        let library = Library::seeded().context("failed to seed the content catalog")?;
        Ok(Self::with_library(config, platform, library))
    }

    pub fn with_library(config: Config, platform: Platform, library: Library) -> Self {
        let state = GateStateStore::new();
        let session = SessionStore::new(
            state.clone(),
            Arc::clone(&platform.credentials),
            Arc::clone(&platform.auth_api),
            config.session.clone(),
            &config.biometric,
        );
        let biometric = BiometricGate::new(
            state.clone(),
            Arc::clone(&platform.biometric),
            Arc::clone(&platform.credentials),
            config.biometric.clone(),
        );
        let capture = CaptureGuard::new(
            Arc::clone(&platform.capture),
            platform.document.clone(),
            &config.capture,
        );
        let redirector = AuthRedirector::new(Arc::clone(&platform.navigator));
        let redirects = redirector.reports();

        Self {
            config,
            state,
            session,
            biometric,
            capture,
            library: Arc::new(library),
            cancel: CancellationToken::new(),
            redirector: Mutex::new(Some(redirector)),
            redirector_task: Mutex::new(None),
            redirects,
        }
    }

    /// Start the redirector and hydrate the persisted session. A failed
    /// hydration still settles the gate (signed out) before returning.
    pub async fn boot(&self) -> AuthResult<HydrateOutcome> {
        self.start_redirector();

        let outcome = self.session.hydrate(&self.cancel).await;
        match &outcome {
            Ok(outcome) => info!(?outcome, "boot hydration finished"),
            Err(err) => warn!(error = %err, "boot hydration failed"),
        }
        outcome
    }

    fn start_redirector(&self) {
        let Some(redirector) = self.redirector.lock().take() else {
            return;
        };
        let task = tokio::spawn(redirector.run(self.state.subscribe(), self.cancel.child_token()));
        *self.redirector_task.lock() = Some(task);
        debug!("redirector started");
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn biometric(&self) -> &BiometricGate {
        &self.biometric
    }

    pub fn capture(&self) -> &CaptureGuard {
        &self.capture
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    pub fn snapshot(&self) -> GateSnapshot {
        self.state.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<GateSnapshot> {
        self.state.subscribe()
    }

    pub fn redirects(&self) -> watch::Receiver<RedirectReport> {
        self.redirects.clone()
    }

    /// Token for work that must stop at teardown, such as a challenge
    /// started from a screen.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Mark a protected screen as mounted for the lifetime of the scope.
    pub fn protect_screen(&self) -> CaptureScope {
        self.capture.engage()
    }

    /// Cancel in-flight work, stop accepting state changes and lift capture
    /// protection.
    pub async fn teardown(&self) {
        self.cancel.cancel();
        self.state.close();
        self.capture.shutdown();

        let task = self.redirector_task.lock().take();
        if let Some(task) = task
            && let Err(err) = task.await
        {
            warn!(error = %err, "redirector task ended abnormally");
        }
        info!("app context torn down");
    }
}
