//! Session store
//!
//! Owns the identity half of the gate state. Every public operation ends in
//! exactly one transition of the shared [`GateStateStore`], so subscribers
//! never observe a half-finished login or logout.

use std::sync::Arc;

use chrono::Utc;
use cinevault_config::{BiometricConfig, SessionConfig};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::credential::{AuthToken, Credentials, RegisterRequest};
use super::state::{GateSnapshot, GateStateStore};
use crate::error::{AuthError, AuthResult};
use crate::platform::{AuthApi, CredentialStore};

/// How a hydration attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// A persisted session was restored.
    Restored,
    /// Nothing usable was persisted; the user has to sign in.
    SignedOut,
    /// The caller went away before storage answered. State untouched.
    Cancelled,
}

#[derive(Clone)]
pub struct SessionStore {
    state: GateStateStore,
    credentials: Arc<dyn CredentialStore>,
    auth_api: Arc<dyn AuthApi>,
    config: SessionConfig,
    default_require_on_login: bool,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("default_require_on_login", &self.default_require_on_login)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(
        state: GateStateStore,
        credentials: Arc<dyn CredentialStore>,
        auth_api: Arc<dyn AuthApi>,
        config: SessionConfig,
        biometric: &BiometricConfig,
    ) -> Self {
        Self {
            state,
            credentials,
            auth_api,
            config,
            default_require_on_login: biometric.require_on_login,
        }
    }

    pub fn state(&self) -> &GateStateStore {
        &self.state
    }

    pub fn snapshot(&self) -> GateSnapshot {
        self.state.current()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.with_state(|s| s.session.is_authenticated)
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.state.with_state(|s| s.session.token.clone())
    }

    /// Restore the persisted session and the biometric preferences.
    ///
    /// `is_loading` is cleared on every path except cancellation. A
    /// cancelled hydrate means the owner is going away, and nothing may be
    /// written to the gate state after that point, so the snapshot is left
    /// exactly as it was, loading flag included.
    pub async fn hydrate(&self, cancel: &CancellationToken) -> AuthResult<HydrateOutcome> {
        self.state.transition(|s| {
            s.session.is_loading = true;
            true
        });

        let load = futures::future::join3(
            self.credentials.load_token(),
            self.credentials.load_biometric_enabled(),
            self.credentials.load_biometric_required(),
        );
        let (token, biometric_enabled, require_on_login) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("hydration cancelled");
                return Ok(HydrateOutcome::Cancelled);
            }
            loaded = load => loaded,
        };

        let biometric_enabled = biometric_enabled.unwrap_or_else(|err| {
            warn!(error = %err, "failed to read biometric preference, assuming disabled");
            false
        });
        let require_on_login = require_on_login
            .unwrap_or_else(|err| {
                warn!(error = %err, "failed to read biometric requirement, using default");
                None
            })
            .unwrap_or(self.default_require_on_login);
        let prefs = (biometric_enabled, require_on_login);

        let token = match token {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "failed to read stored session");
                self.settle_signed_out(prefs);
                return Err(AuthError::Storage(err));
            }
        };

        let token = match token {
            Some(token) if token.is_expired_at(Utc::now(), self.config.token_expiry_buffer) => {
                info!(expires_at = ?token.expires_at(), "stored session expired, discarding");
                if let Err(err) = self.credentials.clear_token().await {
                    warn!(error = %err, "failed to clear expired session");
                }
                None
            }
            other => other,
        };

        let Some(token) = token else {
            self.settle_signed_out(prefs);
            return Ok(HydrateOutcome::SignedOut);
        };

        self.state.transition(|s| {
            s.session.is_loading = false;
            s.session.is_authenticated = true;
            s.session.token = Some(token);
            s.biometric.enabled = biometric_enabled;
            s.biometric.require_on_login = Some(require_on_login);
            s.biometric.required = biometric_enabled && require_on_login;
            s.biometric.authenticated = false;
            s.biometric.failed_attempts = 0;
            s.epoch += 1;
            true
        });
        info!(biometric_enabled, require_on_login, "session restored");
        Ok(HydrateOutcome::Restored)
    }

    fn settle_signed_out(&self, (biometric_enabled, require_on_login): (bool, bool)) {
        self.state.transition(|s| {
            s.session.is_loading = false;
            s.session.is_authenticated = false;
            s.session.token = None;
            s.biometric.enabled = biometric_enabled;
            s.biometric.require_on_login = Some(require_on_login);
            s.biometric.failed_attempts = 0;
            true
        });
    }

    /// Sign in. On failure the state is left exactly as it was.
    pub async fn login(&self, credentials: Credentials) -> AuthResult<()> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::Validation(
                "email and password are required".to_string(),
            ));
        }

        let token = self.auth_api.login(&credentials).await?;
        info!(account = %credentials.account_key(), "signed in");
        self.begin_session(token).await;
        Ok(())
    }

    /// Create an account and sign straight into it.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<()> {
        if request.display_name.trim().is_empty() {
            return Err(AuthError::Validation("display name is required".to_string()));
        }

        let token = self.auth_api.register(&request).await?;
        info!(account = %request.email.trim(), "account registered");
        self.begin_session(token).await;
        Ok(())
    }

    async fn begin_session(&self, token: AuthToken) {
        if let Err(err) = self.credentials.save_token(&token).await {
            warn!(error = %err, "failed to persist session, it will not survive a restart");
        }

        let default_require = self.default_require_on_login;
        self.state.transition(|s| {
            let require = s.biometric.require_on_login.unwrap_or(default_require);
            s.session.is_authenticated = true;
            s.session.token = Some(token);
            s.biometric.authenticated = false;
            s.biometric.required = s.biometric.enabled && require;
            s.biometric.failed_attempts = 0;
            s.epoch += 1;
            true
        });
    }

    /// Sign out locally and tell the backend in the background. Never fails:
    /// local state is cleared even when storage or the network misbehave.
    pub async fn logout(&self) {
        self.end_session(true).await;
        info!("signed out");
    }

    /// Exchange the refresh token for a new pair. A rejected refresh ends the
    /// session; a network failure keeps it.
    pub async fn refresh(&self) -> AuthResult<()> {
        let (token, epoch) = self
            .state
            .with_state(|s| (s.session.token.clone(), s.epoch));
        let token = token.ok_or(AuthError::NotAuthenticated)?;

        if !token.has_refresh_token() {
            warn!("session has no refresh token, ending it");
            self.end_session(false).await;
            return Err(AuthError::SessionExpired);
        }

        match self.auth_api.refresh(&token).await {
            Ok(refreshed) => {
                if let Err(err) = self.credentials.save_token(&refreshed).await {
                    warn!(error = %err, "failed to persist refreshed session");
                }
                let applied = self.state.transition(|s| {
                    if s.epoch != epoch || !s.session.is_authenticated {
                        return false;
                    }
                    s.session.token = Some(refreshed);
                    true
                });
                if applied {
                    debug!("session refreshed");
                } else {
                    debug!("session changed during refresh, discarding new token");
                }
                Ok(())
            }
            Err(AuthError::SessionExpired | AuthError::InvalidCredentials) => {
                warn!("refresh rejected, ending session");
                self.end_session(false).await;
                Err(AuthError::SessionExpired)
            }
            Err(err) => {
                debug!(error = %err, "refresh failed, keeping session");
                Err(err)
            }
        }
    }

    async fn end_session(&self, notify_remote: bool) {
        let mut previous = None;
        self.state.transition(|s| {
            previous = s.session.token.take();
            if s.session.is_authenticated {
                s.epoch += 1;
            }
            s.session.is_authenticated = false;
            s.biometric.authenticated = false;
            s.biometric.required = false;
            s.biometric.failed_attempts = 0;
            true
        });

        if let Err(err) = self.credentials.clear_token().await {
            warn!(error = %err, "failed to clear stored session");
        }

        if let Some(token) = previous.filter(|_| notify_remote) {
            self.spawn_remote_logout(token);
        }
    }

    fn spawn_remote_logout(&self, token: AuthToken) {
        let api = Arc::clone(&self.auth_api);
        let timeout = self.config.remote_logout_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, api.logout(&token)).await {
                Ok(Ok(())) => debug!("remote logout acknowledged"),
                Ok(Err(err)) => debug!(error = %err, "remote logout failed"),
                Err(_) => debug!(?timeout, "remote logout timed out"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MemoryCredentialStore, MockAuthApi};

    fn store_with(
        credentials: Arc<MemoryCredentialStore>,
        api: Arc<MockAuthApi>,
    ) -> SessionStore {
        SessionStore::new(
            GateStateStore::new(),
            credentials,
            api,
            SessionConfig::default(),
            &BiometricConfig::default(),
        )
    }

    #[tokio::test]
    async fn hydrate_without_token_settles_signed_out() {
        let store = store_with(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MockAuthApi::new()),
        );

        let outcome = store.hydrate(&CancellationToken::new()).await.unwrap();
        assert_eq!(outcome, HydrateOutcome::SignedOut);
        let snapshot = store.snapshot();
        assert!(!snapshot.session.is_loading);
        assert!(!snapshot.session.is_authenticated);
    }

    #[tokio::test]
    async fn hydrate_storage_failure_surfaces_error_and_stops_loading() {
        let credentials = Arc::new(MemoryCredentialStore::with_token(AuthToken::new(
            "a", "r", 0,
        )));
        credentials.set_failing(true);
        let store = store_with(credentials, Arc::new(MockAuthApi::new()));

        let err = store.hydrate(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::Storage(_)));
        let snapshot = store.snapshot();
        assert!(!snapshot.session.is_loading);
        assert!(!snapshot.session.is_authenticated);
    }

    #[tokio::test]
    async fn expired_token_is_discarded() {
        let mut token = AuthToken::new("a", "r", 30);
        token.issued_at = Utc::now() - chrono::Duration::hours(1);
        let credentials = Arc::new(MemoryCredentialStore::with_token(token));
        let store = store_with(credentials.clone(), Arc::new(MockAuthApi::new()));

        let outcome = store.hydrate(&CancellationToken::new()).await.unwrap();
        assert_eq!(outcome, HydrateOutcome::SignedOut);
        assert!(credentials.stored_token().is_none());
    }

    #[tokio::test]
    async fn saved_requirement_overrides_configured_default() {
        let credentials = Arc::new(MemoryCredentialStore::with_token(AuthToken::new(
            "a", "r", 0,
        )));
        credentials.set_biometric_enabled(true);
        credentials.set_biometric_required(false);
        let store = store_with(credentials, Arc::new(MockAuthApi::new()));

        let outcome = store.hydrate(&CancellationToken::new()).await.unwrap();
        assert_eq!(outcome, HydrateOutcome::Restored);
        let biometric = store.snapshot().biometric;
        assert!(biometric.enabled);
        assert_eq!(biometric.require_on_login, Some(false));
        assert!(!biometric.required);
    }

    #[tokio::test]
    async fn failed_login_leaves_state_untouched() {
        let api = Arc::new(MockAuthApi::new().with_account("ann@example.com", "secret1"));
        let store = store_with(Arc::new(MemoryCredentialStore::new()), api);
        store.hydrate(&CancellationToken::new()).await.unwrap();
        let before = store.snapshot();

        let err = store
            .login(Credentials::new("ann@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn blank_credentials_are_rejected_locally() {
        let store = store_with(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MockAuthApi::new()),
        );
        let err = store.login(Credentials::new("  ", "pw")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn network_failure_on_refresh_keeps_session() {
        let api = Arc::new(MockAuthApi::new().with_account("ann@example.com", "secret1"));
        let store = store_with(Arc::new(MemoryCredentialStore::new()), api.clone());
        store
            .login(Credentials::new("ann@example.com", "secret1"))
            .await
            .unwrap();

        api.set_offline(true);
        let err = store.refresh().await.unwrap_err();
        assert!(matches!(err, AuthError::Network(_)));
        assert!(store.is_authenticated());
    }
}
