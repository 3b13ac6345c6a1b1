//! Identity state: credentials, the shared gate snapshot and the session store.

pub mod credential;
pub mod state;
pub mod store;

pub use credential::{AuthToken, Credentials, RegisterRequest, SecureCredential};
pub use state::{BiometricState, GateSnapshot, GateStateStore, SessionState};
pub use store::{HydrateOutcome, SessionStore};
