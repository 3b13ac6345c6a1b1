use std::sync::Arc;
use std::time::Duration;

use cinevault_config::Config;
use cinevault_core::capture::SELECTION_BLOCK_CSS;
use cinevault_core::platform::{
    KeyChord, MemoryCredentialStore, MockAuthApi, RecordingNavigator, SimulatedBiometricPrompt,
    SimulatedDocument, SimulatedScreenCapture, WindowMetrics,
};
use cinevault_core::{AppContext, CaptureError, Platform, Route};

fn window(devtools_px: u32) -> WindowMetrics {
    WindowMetrics {
        outer_width: 1440 + devtools_px,
        outer_height: 900,
        inner_width: 1440,
        inner_height: 900,
    }
}

fn context(
    capture: Arc<SimulatedScreenCapture>,
    document: Option<Arc<SimulatedDocument>>,
) -> AppContext {
    let platform = Platform {
        credentials: Arc::new(MemoryCredentialStore::new()),
        auth_api: Arc::new(MockAuthApi::new()),
        biometric: Arc::new(SimulatedBiometricPrompt::new()),
        capture,
        navigator: Arc::new(RecordingNavigator::new(Route::Home)),
        document: document.map(|d| d as Arc<dyn cinevault_core::platform::DocumentHooks>),
    };
    AppContext::init(Config::default(), platform).unwrap()
}

#[tokio::test]
async fn protection_follows_mounted_screens() {
    let capture = Arc::new(SimulatedScreenCapture::new());
    let app = context(capture.clone(), None);

    let player = app.protect_screen();
    let details = app.protect_screen();
    assert_eq!(app.capture().engaged_count(), 2);
    assert!(capture.is_blocked());

    drop(player);
    assert!(capture.is_blocked());
    drop(details);
    assert!(!capture.is_blocked());
    assert_eq!((capture.prevent_calls(), capture.allow_calls()), (1, 1));

    app.capture().release();
    assert_eq!(app.capture().engaged_count(), 0);
    assert_eq!(capture.allow_calls(), 1);
}

#[tokio::test]
async fn failing_platform_never_reaches_the_screen() {
    let capture = Arc::new(SimulatedScreenCapture::new());
    capture.fail_with(Some(CaptureError::Platform("window server gone".into())));
    let app = context(capture.clone(), None);

    let scope = app.protect_screen();
    assert!(app.capture().is_active());
    drop(scope);
    assert!(!app.capture().is_active());
}

#[tokio::test(start_paused = true)]
async fn web_falls_back_to_advisory_shield() {
    let capture = Arc::new(SimulatedScreenCapture::unsupported());
    let document = Arc::new(SimulatedDocument::new(window(0)));
    let app = context(capture.clone(), Some(document.clone()));

    let scope = app.protect_screen();
    assert!(app.capture().advisory_active());
    assert!(document.context_menu_blocked());
    assert!(document.swallows(&KeyChord::ctrl_shift("I")));
    assert!(!document.swallows(&KeyChord::ctrl("c")));
    assert_eq!(document.stylesheet(), Some(SELECTION_BLOCK_CSS));

    document.resize(window(300));
    tokio::time::sleep(Duration::from_millis(1_100)).await;
    let shield = app.capture().shield().unwrap();
    assert!(shield.devtools_suspected());

    drop(scope);
    assert!(!app.capture().advisory_active());
    assert!(!document.context_menu_blocked());
    assert_eq!(document.stylesheet(), None);
}

#[tokio::test]
async fn teardown_lifts_outstanding_protection() {
    let capture = Arc::new(SimulatedScreenCapture::new());
    let app = context(capture.clone(), None);
    app.boot().await.unwrap();

    let scope = app.protect_screen();
    app.teardown().await;
    assert!(!capture.is_blocked());

    drop(scope);
    assert_eq!(capture.allow_calls(), 1);
}
