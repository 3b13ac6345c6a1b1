//! Reference-counted capture protection
//!
//! Each protected screen holds a [`CaptureScope`]. The first scope turns
//! protection on, the last one to go turns it off. Platform failures are
//! logged and never reach the screen.

use std::sync::Arc;

use cinevault_config::CaptureConfig;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::advisory::AdvisoryShield;
use crate::platform::{CaptureOutcome, DocumentHooks, ScreenCapture};

#[derive(Debug, Default)]
struct Engagement {
    count: usize,
    /// Bumped by [`CaptureGuard::shutdown`]; scopes from an older
    /// generation no longer count.
    generation: u64,
}

struct GuardInner {
    engaged: Mutex<Engagement>,
    capture: Arc<dyn ScreenCapture>,
    shield: Option<AdvisoryShield>,
    enabled: bool,
}

#[derive(Clone)]
pub struct CaptureGuard {
    inner: Arc<GuardInner>,
}

impl std::fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGuard")
            .field("engaged", &self.engaged_count())
            .field("enabled", &self.inner.enabled)
            .field("shield", &self.inner.shield)
            .finish_non_exhaustive()
    }
}

impl CaptureGuard {
    pub fn new(
        capture: Arc<dyn ScreenCapture>,
        document: Option<Arc<dyn DocumentHooks>>,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            inner: Arc::new(GuardInner {
                engaged: Mutex::new(Engagement::default()),
                capture,
                shield: document.map(|document| AdvisoryShield::new(document, config)),
                enabled: config.enabled,
            }),
        }
    }

    /// Number of protected screens currently mounted.
    pub fn engaged_count(&self) -> usize {
        self.inner.engaged.lock().count
    }

    pub fn is_active(&self) -> bool {
        self.engaged_count() > 0
    }

    /// Whether the web fallback is currently installed.
    pub fn advisory_active(&self) -> bool {
        self.inner
            .shield
            .as_ref()
            .is_some_and(AdvisoryShield::is_installed)
    }

    pub fn shield(&self) -> Option<&AdvisoryShield> {
        self.inner.shield.as_ref()
    }

    /// Register a protected screen. Protection lasts until the scope drops.
    pub fn engage(&self) -> CaptureScope {
        let mut engaged = self.inner.engaged.lock();
        engaged.count += 1;
        if engaged.count == 1 {
            self.protect();
        }
        debug!(engaged = engaged.count, "capture guard engaged");
        CaptureScope {
            guard: Some(self.clone()),
            generation: engaged.generation,
        }
    }

    /// Drop one engagement. Extra releases are ignored.
    pub fn release(&self) {
        let mut engaged = self.inner.engaged.lock();
        self.release_locked(&mut engaged);
    }

    fn release_scope(&self, generation: u64) {
        let mut engaged = self.inner.engaged.lock();
        if engaged.generation != generation {
            debug!(generation, "ignoring capture scope from before shutdown");
            return;
        }
        self.release_locked(&mut engaged);
    }

    fn release_locked(&self, engaged: &mut Engagement) {
        if engaged.count == 0 {
            debug!("capture guard release with nothing engaged");
            return;
        }
        engaged.count -= 1;
        if engaged.count == 0 {
            self.unprotect();
        }
        debug!(engaged = engaged.count, "capture guard released");
    }

    /// Turn protection off regardless of outstanding scopes. Scopes issued
    /// before the shutdown are ignored when they drop.
    pub fn shutdown(&self) {
        let mut engaged = self.inner.engaged.lock();
        engaged.generation += 1;
        if engaged.count > 0 {
            engaged.count = 0;
            self.unprotect();
        }
    }

    fn protect(&self) {
        if !self.inner.enabled {
            return;
        }
        match self.inner.capture.prevent() {
            Ok(CaptureOutcome::Applied) => debug!("screen capture blocked"),
            Ok(CaptureOutcome::Unsupported) => match &self.inner.shield {
                Some(shield) => shield.install(),
                None => debug!("screen capture protection unsupported on this platform"),
            },
            Err(err) => warn!(error = %err, "failed to block screen capture"),
        }
    }

    fn unprotect(&self) {
        if !self.inner.enabled {
            return;
        }
        if let Some(shield) = &self.inner.shield {
            shield.uninstall();
        }
        match self.inner.capture.allow() {
            Ok(_) => debug!("screen capture allowed"),
            Err(err) => warn!(error = %err, "failed to restore screen capture"),
        }
    }
}

/// One mounted protected screen. Releases its engagement when dropped.
#[must_use = "protection ends when the scope is dropped"]
#[derive(Debug)]
pub struct CaptureScope {
    guard: Option<CaptureGuard>,
    generation: u64,
}

impl CaptureScope {
    /// Keep the engagement without a scope; pair with
    /// [`CaptureGuard::release`].
    pub fn detach(mut self) {
        self.guard = None;
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            guard.release_scope(self.generation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CaptureError;
    use crate::platform::SimulatedScreenCapture;

    fn guard(capture: Arc<SimulatedScreenCapture>) -> CaptureGuard {
        CaptureGuard::new(capture, None, &CaptureConfig::default())
    }

    #[test]
    fn nested_scopes_share_one_platform_call() {
        let capture = Arc::new(SimulatedScreenCapture::new());
        let guard = guard(capture.clone());

        let outer = guard.engage();
        let inner = guard.engage();
        assert_eq!(capture.prevent_calls(), 1);
        assert!(capture.is_blocked());

        drop(inner);
        assert!(capture.is_blocked());
        assert_eq!(capture.allow_calls(), 0);

        drop(outer);
        assert!(!capture.is_blocked());
        assert_eq!(capture.allow_calls(), 1);
    }

    #[test]
    fn release_floors_at_zero() {
        let capture = Arc::new(SimulatedScreenCapture::new());
        let guard = guard(capture.clone());

        guard.release();
        guard.release();
        assert_eq!(guard.engaged_count(), 0);
        assert_eq!(capture.allow_calls(), 0);

        let _scope = guard.engage();
        assert_eq!(guard.engaged_count(), 1);
        assert_eq!(capture.prevent_calls(), 1);
    }

    #[test]
    fn scope_releases_on_unwind() {
        let capture = Arc::new(SimulatedScreenCapture::new());
        let guard = guard(capture.clone());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = guard.engage();
            panic!("screen crashed");
        }));
        assert!(result.is_err());
        assert_eq!(guard.engaged_count(), 0);
        assert!(!capture.is_blocked());
    }

    #[test]
    fn platform_errors_are_swallowed() {
        let capture = Arc::new(SimulatedScreenCapture::new());
        capture.fail_with(Some(CaptureError::PermissionDenied));
        let guard = guard(capture.clone());

        let scope = guard.engage();
        assert!(guard.is_active());
        drop(scope);
        assert!(!guard.is_active());
    }

    #[test]
    fn disabled_guard_never_touches_platform() {
        let capture = Arc::new(SimulatedScreenCapture::new());
        let config = CaptureConfig {
            enabled: false,
            ..CaptureConfig::default()
        };
        let guard = CaptureGuard::new(capture.clone(), None, &config);

        let _scope = guard.engage();
        assert_eq!(capture.prevent_calls(), 0);
    }

    #[test]
    fn scopes_from_before_shutdown_do_not_lift_new_protection() {
        let capture = Arc::new(SimulatedScreenCapture::new());
        let guard = guard(capture.clone());

        let stale = guard.engage();
        guard.shutdown();
        assert!(!capture.is_blocked());

        let fresh = guard.engage();
        drop(stale);
        assert_eq!(guard.engaged_count(), 1);
        assert!(capture.is_blocked());

        drop(fresh);
        assert_eq!(guard.engaged_count(), 0);
        assert!(!capture.is_blocked());
    }

    #[test]
    fn detached_scope_waits_for_manual_release() {
        let capture = Arc::new(SimulatedScreenCapture::new());
        let guard = guard(capture.clone());

        guard.engage().detach();
        assert!(capture.is_blocked());
        guard.release();
        assert!(!capture.is_blocked());
    }
}
