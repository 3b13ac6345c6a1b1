//! Web document hooks used when the platform has no capture policy.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::CaptureError;

/// A key press with the modifiers the shortcut filter cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyChord {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            ctrl: true,
            ..Self::plain(key)
        }
    }

    pub fn ctrl_shift(key: &str) -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Self::plain(key)
        }
    }
}

/// Returns true for key presses the document should swallow.
pub type KeyFilter = fn(&KeyChord) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMetrics {
    pub outer_width: u32,
    pub outer_height: u32,
    pub inner_width: u32,
    pub inner_height: u32,
}

pub trait DocumentHooks: Send + Sync {
    fn block_context_menu(&self, blocked: bool) -> Result<(), CaptureError>;

    /// Install (`Some`) or remove (`None`) a keydown filter.
    fn filter_keys(&self, filter: Option<KeyFilter>) -> Result<(), CaptureError>;

    /// Inject (`Some`) or remove (`None`) the protection stylesheet.
    fn set_stylesheet(&self, css: Option<&'static str>) -> Result<(), CaptureError>;

    /// `None` when the window cannot be measured (e.g. not yet laid out).
    fn window_metrics(&self) -> Option<WindowMetrics>;
}

/// In-memory document: records hook state and lets tests resize the window.
#[derive(Debug)]
pub struct SimulatedDocument {
    context_menu_blocked: AtomicBool,
    key_filter: Mutex<Option<KeyFilter>>,
    stylesheet: Mutex<Option<&'static str>>,
    metrics: Mutex<Option<WindowMetrics>>,
}

impl SimulatedDocument {
    pub fn new(metrics: WindowMetrics) -> Self {
        Self {
            context_menu_blocked: AtomicBool::new(false),
            key_filter: Mutex::new(None),
            stylesheet: Mutex::new(None),
            metrics: Mutex::new(Some(metrics)),
        }
    }

    pub fn resize(&self, metrics: WindowMetrics) {
        *self.metrics.lock() = Some(metrics);
    }

    pub fn context_menu_blocked(&self) -> bool {
        self.context_menu_blocked.load(Ordering::Acquire)
    }

    pub fn stylesheet(&self) -> Option<&'static str> {
        *self.stylesheet.lock()
    }

    /// Would the installed filter swallow `chord`?
    pub fn swallows(&self, chord: &KeyChord) -> bool {
        self.key_filter
            .lock()
            .is_some_and(|filter| filter(chord))
    }
}

impl DocumentHooks for SimulatedDocument {
    fn block_context_menu(&self, blocked: bool) -> Result<(), CaptureError> {
        self.context_menu_blocked.store(blocked, Ordering::Release);
        Ok(())
    }

    fn filter_keys(&self, filter: Option<KeyFilter>) -> Result<(), CaptureError> {
        *self.key_filter.lock() = filter;
        Ok(())
    }

    fn set_stylesheet(&self, css: Option<&'static str>) -> Result<(), CaptureError> {
        *self.stylesheet.lock() = css;
        Ok(())
    }

    fn window_metrics(&self) -> Option<WindowMetrics> {
        *self.metrics.lock()
    }
}
