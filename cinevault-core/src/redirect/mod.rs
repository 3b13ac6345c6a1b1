//! Redirect policy and the reactive redirector that applies it.

pub mod policy;
pub mod redirector;

pub use policy::{RedirectDecision, RedirectInputs, Route, decide};
pub use redirector::{AuthRedirector, RedirectReport};
