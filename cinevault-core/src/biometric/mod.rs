//! Biometric step-up on top of an authenticated session.

pub mod gate;

pub use gate::BiometricGate;
