//! Session gating core for the CineVault client.
//!
//! The crate owns the state that decides which screen a user may see:
//!
//! - [`session::SessionStore`] restores, starts and ends sessions.
//! - [`biometric::BiometricGate`] adds an optional biometric step-up.
//! - [`redirect`] maps the combined state to a navigation decision and
//!   applies it through a [`platform::Navigator`].
//! - [`capture::CaptureGuard`] blocks screen capture while protected screens
//!   are mounted.
//!
//! All platform access goes through the traits in [`platform`]. The
//! [`library`] module holds the simple keyed stores the screens read from,
//! and [`app::AppContext`] wires everything together.
#![allow(missing_docs)]

pub mod app;
pub mod biometric;
pub mod capture;
pub mod error;
pub mod library;
pub mod platform;
pub mod redirect;
pub mod session;

pub use app::AppContext;
pub use biometric::BiometricGate;
pub use capture::{CaptureGuard, CaptureScope};
pub use error::{
    AuthError, AuthResult, BiometricError, BiometricResult, CaptureError, LibraryError,
    LibraryResult, NetworkError, StorageError,
};
pub use library::Library;
pub use platform::Platform;
pub use redirect::{AuthRedirector, RedirectDecision, RedirectInputs, RedirectReport, Route, decide};
pub use session::{
    AuthToken, Credentials, GateSnapshot, GateStateStore, HydrateOutcome, RegisterRequest,
    SessionStore,
};
