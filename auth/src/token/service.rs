use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::TokenClaims;
use super::errors::TokenError;
use super::key::SigningKey;

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact JWS string handed to the client
    pub token: String,
    pub claims: TokenClaims,
}

/// Issues and validates signed, time-bounded access tokens.
///
/// Tokens are HS256 JWTs. Validation trusts its own signed claims and never
/// consults a user store; there is no revocation list.
#[derive(Debug, Clone)]
pub struct TokenService {
    key: SigningKey,
    validity: Duration,
    algorithm: Algorithm,
}

impl TokenService {
    /// Create a token service owning `key`, issuing tokens valid for `validity`.
    pub fn new(key: SigningKey, validity: Duration) -> Self {
        Self {
            key,
            validity,
            algorithm: Algorithm::HS256,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Sign a token for `subject` granting `authorities`, issued now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue(&self, subject: &str, authorities: &[String]) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, authorities, Utc::now())
    }

    /// Sign a token as if issued at `now`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token signing failed
    pub fn issue_at(
        &self,
        subject: &str,
        authorities: &[String],
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let claims = TokenClaims::new(subject, authorities.to_vec(), now, self.validity);
        let header = Header::new(self.algorithm);

        let token = encode(&header, &claims, &self.key.encoding)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify a token's signature and expiry against the current time.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed token or signature mismatch
    /// * `ExpiredToken` - Current time is at or past the token's expiry
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Verify a token's signature and expiry against `now`.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed token or signature mismatch
    /// * `ExpiredToken` - `now` is at or past the token's expiry
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the caller's clock, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<TokenClaims>(token, &self.key.decoding, &validation)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?;

        if token_data.claims.is_expired_at(now.timestamp()) {
            return Err(TokenError::ExpiredToken);
        }

        Ok(token_data.claims)
    }
}
