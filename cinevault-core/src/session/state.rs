//! Gate state shared by the Session Store and the Biometric Gate
//!
//! Both halves of the state are published together through one watch
//! channel so a subscriber never observes a half-applied transition. Only
//! the session store and the biometric gate hold the mutating handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::session::credential::AuthToken;

/// Identity state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    /// True from process start until the first hydration settles.
    pub is_loading: bool,
    pub token: Option<AuthToken>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
            token: None,
        }
    }
}

/// Step-up state layered on top of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiometricState {
    /// User preference, persisted by the credential store.
    pub enabled: bool,
    /// Set when the current session needs a challenge before unlocking.
    pub required: bool,
    /// Set by a successful challenge; reset by login and logout.
    pub authenticated: bool,
    /// Failed challenges in this session.
    pub failed_attempts: u32,
    /// Persisted choice to challenge after every login. `None` until it
    /// has been restored or set, in which case the configured default
    /// applies.
    pub require_on_login: Option<bool>,
}

/// One consistent view of the gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateSnapshot {
    pub session: SessionState,
    pub biometric: BiometricState,
    /// Bumped whenever a session starts or ends, so in-flight work can
    /// tell whether the session it started under is still current.
    pub epoch: u64,
}

impl GateSnapshot {
    /// Step-up state must never outlive the session it belongs to.
    fn normalize(&mut self) {
        if !self.session.is_authenticated {
            self.biometric.authenticated = false;
            self.biometric.required = false;
        }
    }
}

/// Watch-channel backed store for [`GateSnapshot`].
#[derive(Clone, Debug)]
pub struct GateStateStore {
    sender: Arc<watch::Sender<GateSnapshot>>,
    closed: Arc<AtomicBool>,
}

impl GateStateStore {
    /// Fresh store in the loading state.
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(GateSnapshot::default());
        Self {
            sender: Arc::new(sender),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn current(&self) -> GateSnapshot {
        self.sender.borrow().clone()
    }

    /// Access state without cloning
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&GateSnapshot) -> R,
    {
        f(&self.sender.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<GateSnapshot> {
        self.sender.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stop accepting transitions. Late results from cancelled work land
    /// here and are dropped.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Apply `f` as a single atomic transition. `f` returns whether it
    /// changed anything (edits are rolled back when it returns false);
    /// subscribers are only woken when the snapshot really differs. Returns
    /// false without running `f` once the store is closed.
    pub(crate) fn transition<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut GateSnapshot) -> bool,
    {
        if self.is_closed() {
            tracing::debug!("gate store closed, dropping transition");
            return false;
        }
        self.sender.send_if_modified(|snapshot| {
            let before = snapshot.clone();
            if !f(snapshot) {
                *snapshot = before;
                return false;
            }
            snapshot.normalize();
            *snapshot != before
        })
    }
}

impl Default for GateStateStore {
    fn default() -> Self {
        Self::new()
    }
}
