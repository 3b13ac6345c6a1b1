//! Auth backend port plus an in-memory account service.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult, NetworkError};
use crate::session::credential::{
    AuthToken, Credentials, RegisterRequest, SecureCredential,
};

const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 60 * 60;
const MIN_PASSWORD_CHARS: usize = 6;

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> AuthResult<AuthToken>;

    async fn register(&self, request: &RegisterRequest) -> AuthResult<AuthToken>;

    /// Exchange the refresh token for a new pair. A rejected refresh token
    /// is reported as [`AuthError::SessionExpired`].
    async fn refresh(&self, token: &AuthToken) -> AuthResult<AuthToken>;

    async fn logout(&self, token: &AuthToken) -> AuthResult<()>;
}

#[derive(Debug)]
struct Account {
    password: SecureCredential,
    display_name: String,
}

/// Account service backed by in-memory maps.
#[derive(Debug)]
pub struct MockAuthApi {
    accounts: DashMap<String, Account>,
    // refresh token -> account key
    refresh_tokens: DashMap<String, String>,
    offline: AtomicBool,
    token_lifetime_secs: u64,
}

impl Default for MockAuthApi {
    fn default() -> Self {
        Self {
            accounts: DashMap::new(),
            refresh_tokens: DashMap::new(),
            offline: AtomicBool::new(false),
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
        }
    }
}

impl MockAuthApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, password: &str) -> Self {
        self.accounts.insert(
            email.trim().to_ascii_lowercase(),
            Account {
                password: password.into(),
                display_name: email.to_string(),
            },
        );
        self
    }

    pub fn with_token_lifetime(mut self, secs: u64) -> Self {
        self.token_lifetime_secs = secs;
        self
    }

    /// Simulate losing connectivity.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Release);
    }

    /// Invalidate every outstanding refresh token, as a server-side
    /// "sign out everywhere" would.
    pub fn revoke_all_sessions(&self) {
        self.refresh_tokens.clear();
    }

    pub fn display_name(&self, email: &str) -> Option<String> {
        self.accounts
            .get(&email.trim().to_ascii_lowercase())
            .map(|account| account.display_name.clone())
    }

    fn ensure_online(&self) -> AuthResult<()> {
        if self.offline.load(Ordering::Acquire) {
            return Err(NetworkError::ServerUnavailable.into());
        }
        Ok(())
    }

    fn issue(&self, account_key: &str) -> AuthToken {
        let refresh = Uuid::new_v4().to_string();
        self.refresh_tokens
            .insert(refresh.clone(), account_key.to_string());
        AuthToken::new(
            Uuid::new_v4().to_string(),
            refresh,
            self.token_lifetime_secs,
        )
    }
}

#[async_trait]
impl AuthApi for MockAuthApi {
    async fn login(&self, credentials: &Credentials) -> AuthResult<AuthToken> {
        self.ensure_online()?;
        let key = credentials.account_key();
        let matches = self
            .accounts
            .get(&key)
            .is_some_and(|account| account.password == credentials.password);
        if !matches {
            debug!(account = %key, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }
        info!(account = %key, "login accepted");
        Ok(self.issue(&key))
    }

    async fn register(&self, request: &RegisterRequest) -> AuthResult<AuthToken> {
        self.ensure_online()?;
        let key = request.email.trim().to_ascii_lowercase();
        if !key.contains('@') {
            return Err(AuthError::Validation(format!(
                "invalid email: {}",
                request.email
            )));
        }
        if request.password.len() < MIN_PASSWORD_CHARS {
            return Err(AuthError::Validation(format!(
                "password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }

        match self.accounts.entry(key.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(AuthError::AccountExists(key)),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Account {
                    password: request.password.clone(),
                    display_name: request.display_name.clone(),
                });
                info!(account = %key, "account registered");
                Ok(self.issue(&key))
            }
        }
    }

    async fn refresh(&self, token: &AuthToken) -> AuthResult<AuthToken> {
        self.ensure_online()?;
        let presented = token.refresh_token.expose_secret();
        let Some((_, account)) = self.refresh_tokens.remove(presented) else {
            return Err(AuthError::SessionExpired);
        };
        Ok(self.issue(&account))
    }

    async fn logout(&self, token: &AuthToken) -> AuthResult<()> {
        self.ensure_online()?;
        self.refresh_tokens
            .remove(token.refresh_token.expose_secret());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refresh_tokens_rotate() {
        let api = MockAuthApi::new().with_account("a@b.c", "secret1");
        let first = api
            .login(&Credentials::new("A@b.c ", "secret1"))
            .await
            .expect("login");
        let second = api.refresh(&first).await.expect("first refresh");
        assert_ne!(first.refresh_token, second.refresh_token);
        assert!(matches!(
            api.refresh(&first).await,
            Err(AuthError::SessionExpired)
        ));
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let api = MockAuthApi::new().with_account("a@b.c", "secret1");
        let request = RegisterRequest {
            email: "a@b.c".into(),
            password: "another1".into(),
            display_name: "A".into(),
        };
        assert!(matches!(
            api.register(&request).await,
            Err(AuthError::AccountExists(_))
        ));
    }

    #[tokio::test]
    async fn offline_maps_to_network_error() {
        let api = MockAuthApi::new().with_account("a@b.c", "secret1");
        api.set_offline(true);
        assert!(matches!(
            api.login(&Credentials::new("a@b.c", "secret1")).await,
            Err(AuthError::Network(NetworkError::ServerUnavailable))
        ));
    }
}
