//! Redirect policy
//!
//! A pure function from the five gate inputs to a [`RedirectDecision`]. The
//! priority order is fixed: loading wins over everything, then the session,
//! then the biometric step-up.

use std::fmt;

use crate::session::GateSnapshot;

/// Screens the redirector knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// Sign-in / sign-up stack.
    Auth,
    /// Biometric step-up screen.
    BiometricAuth,
    /// Main tab navigator.
    Home,
    /// Any other screen, kept verbatim.
    Other(String),
}

impl Route {
    pub const AUTH_PATH: &'static str = "/auth";
    pub const BIOMETRIC_AUTH_PATH: &'static str = "/biometric-auth";
    pub const HOME_PATH: &'static str = "/(tabs)";

    pub fn parse(path: &str) -> Self {
        match path {
            Self::AUTH_PATH => Route::Auth,
            Self::BIOMETRIC_AUTH_PATH => Route::BiometricAuth,
            Self::HOME_PATH => Route::Home,
            other => Route::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Route::Auth => Self::AUTH_PATH,
            Route::BiometricAuth => Self::BIOMETRIC_AUTH_PATH,
            Route::Home => Self::HOME_PATH,
            Route::Other(path) => path,
        }
    }

    /// True when being on `self` already fulfils a redirect to `target`.
    /// Screens nested under the target (`/auth/signup` under `/auth`) count.
    pub fn satisfies(&self, target: &Route) -> bool {
        let here = self.as_str();
        let there = target.as_str();
        here == there
            || here
                .strip_prefix(there)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Screens that only exist to gate access.
    pub fn is_gate(&self) -> bool {
        self.satisfies(&Route::Auth) || self.satisfies(&Route::BiometricAuth)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Route {
    fn from(path: &str) -> Self {
        Route::parse(path)
    }
}

/// Where the app should be, given the current gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectDecision {
    /// Hydration still running; do not navigate.
    Wait,
    Auth,
    BiometricChallenge,
    /// Access granted; leave the user where they are.
    Stay,
}

impl RedirectDecision {
    /// Route to replace to, if any.
    pub fn target(&self) -> Option<Route> {
        match self {
            RedirectDecision::Auth => Some(Route::Auth),
            RedirectDecision::BiometricChallenge => Some(Route::BiometricAuth),
            RedirectDecision::Wait | RedirectDecision::Stay => None,
        }
    }

    pub fn is_gate(&self) -> bool {
        matches!(
            self,
            RedirectDecision::Auth | RedirectDecision::BiometricChallenge
        )
    }
}

impl fmt::Display for RedirectDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RedirectDecision::Wait => "wait",
            RedirectDecision::Auth => "auth",
            RedirectDecision::BiometricChallenge => "biometric-challenge",
            RedirectDecision::Stay => "stay",
        };
        f.write_str(name)
    }
}

/// The only state the policy reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RedirectInputs {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub biometric_required: bool,
    pub biometric_enabled: bool,
    pub biometric_authenticated: bool,
}

impl RedirectInputs {
    /// Every combination of the five flags, in binary counting order with
    /// `is_loading` as the most significant bit.
    pub fn all() -> impl Iterator<Item = RedirectInputs> {
        (0u8..32).map(|bits| RedirectInputs {
            is_loading: bits & 0b10000 != 0,
            is_authenticated: bits & 0b01000 != 0,
            biometric_required: bits & 0b00100 != 0,
            biometric_enabled: bits & 0b00010 != 0,
            biometric_authenticated: bits & 0b00001 != 0,
        })
    }
}

impl From<&GateSnapshot> for RedirectInputs {
    fn from(snapshot: &GateSnapshot) -> Self {
        Self {
            is_loading: snapshot.session.is_loading,
            is_authenticated: snapshot.session.is_authenticated,
            biometric_required: snapshot.biometric.required,
            biometric_enabled: snapshot.biometric.enabled,
            biometric_authenticated: snapshot.biometric.authenticated,
        }
    }
}

pub fn decide(inputs: RedirectInputs) -> RedirectDecision {
    if inputs.is_loading {
        RedirectDecision::Wait
    } else if !inputs.is_authenticated {
        RedirectDecision::Auth
    } else if inputs.biometric_required
        && inputs.biometric_enabled
        && !inputs.biometric_authenticated
    {
        RedirectDecision::BiometricChallenge
    } else {
        RedirectDecision::Stay
    }
}
