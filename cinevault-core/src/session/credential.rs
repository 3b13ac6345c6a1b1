use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A secret string that is zeroed on drop and never printed.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecureCredential {
    data: String,
}

impl SecureCredential {
    pub fn new(data: String) -> Self {
        Self { data }
    }

    /// Borrow the secret. Avoid holding the reference beyond the lifetime
    /// of the credential: the backing memory is wiped on drop.
    pub fn expose_secret(&self) -> &str {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Clone for SecureCredential {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl PartialEq for SecureCredential {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for SecureCredential {}

impl From<String> for SecureCredential {
    fn from(data: String) -> Self {
        Self::new(data)
    }
}

impl From<&str> for SecureCredential {
    fn from(data: &str) -> Self {
        Self::new(data.to_string())
    }
}

impl fmt::Debug for SecureCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureCredential([REDACTED; {} chars])", self.data.len())
    }
}

impl Serialize for SecureCredential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.data)
    }
}

impl<'de> Deserialize<'de> for SecureCredential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecureCredential::new)
    }
}

/// Email/password pair submitted from the auth screen.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecureCredential,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<SecureCredential>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Normalised email used as the account key.
    pub fn account_key(&self) -> String {
        self.email.trim().to_ascii_lowercase()
    }
}

/// Sign-up form payload.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub password: SecureCredential,
    pub display_name: String,
}

/// Bearer token pair handed out by the backend.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: SecureCredential,
    pub refresh_token: SecureCredential,
    /// Lifetime in seconds from `issued_at`. Zero means the backend did not
    /// say, and the token is treated as non-expiring.
    pub expires_in: u64,
    pub issued_at: DateTime<Utc>,
}

impl AuthToken {
    pub fn new(
        access_token: impl Into<SecureCredential>,
        refresh_token: impl Into<SecureCredential>,
        expires_in: u64,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            expires_in,
            issued_at: Utc::now(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        if self.expires_in == 0 {
            return None;
        }
        let secs = i64::try_from(self.expires_in).unwrap_or(i64::MAX);
        self.issued_at.checked_add_signed(Duration::seconds(secs))
    }

    /// True when fewer than `buffer` remain before expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, buffer: std::time::Duration) -> bool {
        let Some(expires_at) = self.expires_at() else {
            return false;
        };
        let buffer = Duration::from_std(buffer).unwrap_or(Duration::MAX);
        match now.checked_add_signed(buffer) {
            Some(deadline) => deadline >= expires_at,
            None => true,
        }
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &self.access_token)
            .field("refresh_token", &self.refresh_token)
            .field("expires_in", &self.expires_in)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let token = AuthToken::new("access-secret", "refresh-secret", 3600);
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("access-secret"));
        assert!(!rendered.contains("refresh-secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn expiry_honours_buffer() {
        let mut token = AuthToken::new("a", "r", 120);
        token.issued_at = Utc::now() - Duration::seconds(30);
        let buffer = std::time::Duration::from_secs(60);
        assert!(!token.is_expired_at(Utc::now(), buffer));

        token.issued_at = Utc::now() - Duration::seconds(70);
        assert!(token.is_expired_at(Utc::now(), buffer));
    }

    #[test]
    fn zero_lifetime_never_expires() {
        let mut token = AuthToken::new("a", "", 0);
        token.issued_at = Utc::now() - Duration::days(365);
        assert!(!token.is_expired_at(Utc::now(), std::time::Duration::from_secs(60)));
        assert!(!token.has_refresh_token());
    }

    #[test]
    fn token_round_trips_through_json() {
        let token = AuthToken::new("a", "r", 10);
        let json = serde_json::to_string(&token).unwrap();
        let back: AuthToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
