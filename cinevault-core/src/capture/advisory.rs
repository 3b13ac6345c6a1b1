//! Advisory web shield
//!
//! Browsers cannot block screenshots. When the platform reports capture
//! protection as unsupported, these document-level deterrents are installed
//! instead. None of them stop a determined user.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use cinevault_config::CaptureConfig;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CaptureError;
use crate::platform::{DocumentHooks, KeyChord, KeyFilter, WindowMetrics};

/// Disables text selection, image dragging and the iOS callout.
pub const SELECTION_BLOCK_CSS: &str = "* {\n  \
    -webkit-user-select: none !important;\n  \
    -moz-user-select: none !important;\n  \
    -ms-user-select: none !important;\n  \
    user-select: none !important;\n  \
    -webkit-touch-callout: none !important;\n\
}\n\
img, video {\n  \
    -webkit-user-drag: none !important;\n  \
    user-drag: none !important;\n  \
    pointer-events: none !important;\n\
}\n";

/// F12, Ctrl+Shift+I, Ctrl+Shift+J and Ctrl+U.
pub fn is_devtools_shortcut(chord: &KeyChord) -> bool {
    let key = chord.key.to_ascii_uppercase();
    match key.as_str() {
        "F12" => true,
        "I" | "J" => chord.ctrl && chord.shift,
        "U" => chord.ctrl,
        _ => false,
    }
}

/// Docked devtools shrink the inner window relative to the outer one.
pub fn devtools_suspected(metrics: WindowMetrics, threshold_px: u32) -> bool {
    metrics.outer_width.saturating_sub(metrics.inner_width) > threshold_px
        || metrics.outer_height.saturating_sub(metrics.inner_height) > threshold_px
}

pub struct AdvisoryShield {
    document: Arc<dyn DocumentHooks>,
    poll_interval: Duration,
    threshold_px: u32,
    poller: Mutex<Option<CancellationToken>>,
    installed: AtomicBool,
    devtools_open: Arc<AtomicBool>,
}

impl std::fmt::Debug for AdvisoryShield {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisoryShield")
            .field("poll_interval", &self.poll_interval)
            .field("threshold_px", &self.threshold_px)
            .field("installed", &self.is_installed())
            .field("devtools_open", &self.devtools_suspected())
            .finish_non_exhaustive()
    }
}

impl AdvisoryShield {
    pub fn new(document: Arc<dyn DocumentHooks>, config: &CaptureConfig) -> Self {
        Self {
            document,
            poll_interval: config.devtools_poll_interval,
            threshold_px: config.devtools_threshold_px,
            poller: Mutex::new(None),
            installed: AtomicBool::new(false),
            devtools_open: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    /// Latest result of the devtools heuristic.
    pub fn devtools_suspected(&self) -> bool {
        self.devtools_open.load(Ordering::Acquire)
    }

    pub fn install(&self) {
        if self.installed.swap(true, Ordering::AcqRel) {
            return;
        }
        log_hook("context menu", self.document.block_context_menu(true));
        log_hook(
            "shortcut filter",
            self.document
                .filter_keys(Some(is_devtools_shortcut as KeyFilter)),
        );
        log_hook(
            "stylesheet",
            self.document.set_stylesheet(Some(SELECTION_BLOCK_CSS)),
        );
        self.start_polling();
        debug!("advisory capture shield installed");
    }

    pub fn uninstall(&self) {
        if !self.installed.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(token) = self.poller.lock().take() {
            token.cancel();
        }
        log_hook("context menu", self.document.block_context_menu(false));
        log_hook("shortcut filter", self.document.filter_keys(None));
        log_hook("stylesheet", self.document.set_stylesheet(None));
        self.devtools_open.store(false, Ordering::Release);
        debug!("advisory capture shield removed");
    }

    fn start_polling(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no async runtime, devtools heuristic disabled");
            return;
        };

        let token = CancellationToken::new();
        let document = Arc::clone(&self.document);
        let flag = Arc::clone(&self.devtools_open);
        let threshold = self.threshold_px;
        let mut ticker = tokio::time::interval(self.poll_interval);
        let cancel = token.clone();

        runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(metrics) = document.window_metrics() else {
                            continue;
                        };
                        let open = devtools_suspected(metrics, threshold);
                        if open && !flag.swap(true, Ordering::AcqRel) {
                            warn!(?metrics, "developer tools appear to be open");
                        } else if !open {
                            flag.store(false, Ordering::Release);
                        }
                    }
                }
            }
        });

        if let Some(previous) = self.poller.lock().replace(token) {
            previous.cancel();
        }
    }
}

impl Drop for AdvisoryShield {
    fn drop(&mut self) {
        if let Some(token) = self.poller.get_mut().take() {
            token.cancel();
        }
    }
}

fn log_hook(hook: &'static str, result: Result<(), CaptureError>) {
    if let Err(err) = result {
        warn!(hook, error = %err, "advisory capture hook failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SimulatedDocument;

    fn metrics(dw: u32, dh: u32) -> WindowMetrics {
        WindowMetrics {
            outer_width: 1280 + dw,
            outer_height: 800 + dh,
            inner_width: 1280,
            inner_height: 800,
        }
    }

    #[test]
    fn shortcut_filter() {
        assert!(is_devtools_shortcut(&KeyChord::plain("F12")));
        assert!(is_devtools_shortcut(&KeyChord::ctrl_shift("I")));
        assert!(is_devtools_shortcut(&KeyChord::ctrl_shift("j")));
        assert!(is_devtools_shortcut(&KeyChord::ctrl("u")));
        assert!(!is_devtools_shortcut(&KeyChord::ctrl("I")));
        assert!(!is_devtools_shortcut(&KeyChord::plain("U")));
        assert!(!is_devtools_shortcut(&KeyChord::ctrl("c")));
    }

    #[test]
    fn devtools_threshold_is_exclusive() {
        assert!(!devtools_suspected(metrics(160, 0), 160));
        assert!(devtools_suspected(metrics(161, 0), 160));
        assert!(devtools_suspected(metrics(0, 300), 160));
    }

    #[test]
    fn install_and_uninstall_toggle_hooks() {
        let document = Arc::new(SimulatedDocument::new(metrics(0, 0)));
        let shield = AdvisoryShield::new(document.clone(), &CaptureConfig::default());

        shield.install();
        assert!(document.context_menu_blocked());
        assert!(document.swallows(&KeyChord::plain("F12")));
        assert_eq!(document.stylesheet(), Some(SELECTION_BLOCK_CSS));

        shield.uninstall();
        assert!(!document.context_menu_blocked());
        assert!(!document.swallows(&KeyChord::plain("F12")));
        assert_eq!(document.stylesheet(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_flags_docked_devtools() {
        let document = Arc::new(SimulatedDocument::new(metrics(0, 0)));
        let shield = AdvisoryShield::new(document.clone(), &CaptureConfig::default());
        shield.install();

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(!shield.devtools_suspected());

        document.resize(metrics(400, 0));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(shield.devtools_suspected());

        shield.uninstall();
        assert!(!shield.devtools_suspected());
    }
}
