//! Screen capture primitive.
//!
//! The calls are synchronous so a guard can release protection from `Drop`.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::CaptureError;

/// What a successful capture call achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The OS-level policy was changed.
    Applied,
    /// The platform has no capture policy; nothing was changed.
    Unsupported,
}

pub trait ScreenCapture: Send + Sync {
    /// Block screenshots and screen recording.
    fn prevent(&self) -> Result<CaptureOutcome, CaptureError>;

    /// Restore normal capture behaviour.
    fn allow(&self) -> Result<CaptureOutcome, CaptureError>;
}

/// Records calls and tracks the resulting policy.
#[derive(Debug)]
pub struct SimulatedScreenCapture {
    supported: bool,
    blocked: AtomicBool,
    failure: Mutex<Option<CaptureError>>,
    prevent_calls: AtomicUsize,
    allow_calls: AtomicUsize,
}

impl SimulatedScreenCapture {
    pub fn new() -> Self {
        Self {
            supported: true,
            blocked: AtomicBool::new(false),
            failure: Mutex::new(None),
            prevent_calls: AtomicUsize::new(0),
            allow_calls: AtomicUsize::new(0),
        }
    }

    /// A platform without capture APIs, such as a browser.
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    /// Make every call fail with `error` until cleared.
    pub fn fail_with(&self, error: Option<CaptureError>) {
        *self.failure.lock() = error;
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Acquire)
    }

    pub fn prevent_calls(&self) -> usize {
        self.prevent_calls.load(Ordering::Acquire)
    }

    pub fn allow_calls(&self) -> usize {
        self.allow_calls.load(Ordering::Acquire)
    }

    fn apply(&self, blocked: bool) -> Result<CaptureOutcome, CaptureError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        if !self.supported {
            return Ok(CaptureOutcome::Unsupported);
        }
        self.blocked.store(blocked, Ordering::Release);
        Ok(CaptureOutcome::Applied)
    }
}

impl Default for SimulatedScreenCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenCapture for SimulatedScreenCapture {
    fn prevent(&self) -> Result<CaptureOutcome, CaptureError> {
        self.prevent_calls.fetch_add(1, Ordering::AcqRel);
        self.apply(true)
    }

    fn allow(&self) -> Result<CaptureOutcome, CaptureError> {
        self.allow_calls.fetch_add(1, Ordering::AcqRel);
        self.apply(false)
    }
}
