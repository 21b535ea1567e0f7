use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Signed payload of an access token.
///
/// Carries the subject's identity and granted authorities together with the
/// issue and expiry instants (Unix seconds).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,

    /// Granted authorities, e.g. `"ADMIN"`
    #[serde(default)]
    pub authorities: Vec<String>,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,

    /// Unique token identifier
    pub jti: String,
}

impl TokenClaims {
    /// Build claims issued at `issued_at` and valid for `validity`.
    pub fn new(
        subject: impl ToString,
        authorities: Vec<String>,
        issued_at: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        let expires_at = issued_at + validity;

        Self {
            sub: subject.to_string(),
            authorities,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn authorities(&self) -> &[String] {
        &self.authorities
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }

    /// A token stops being valid at its expiry second, not after it.
    pub fn is_expired_at(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
