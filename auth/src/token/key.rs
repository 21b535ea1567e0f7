use std::fmt;

use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

use super::errors::TokenError;

/// HMAC secret used to sign and verify tokens.
///
/// Built once from configuration and handed to the token service; replacing
/// it invalidates every token signed with the previous value.
#[derive(Clone)]
pub struct SigningKey {
    pub(crate) encoding: EncodingKey,
    pub(crate) decoding: DecodingKey,
}

impl SigningKey {
    /// Minimum secret length for HS256 (256 bits).
    pub const MIN_LENGTH: usize = 32;

    /// Build a signing key from raw secret bytes.
    ///
    /// # Errors
    /// * `WeakKey` - Secret is shorter than [`SigningKey::MIN_LENGTH`]
    pub fn from_secret(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.len() < Self::MIN_LENGTH {
            return Err(TokenError::WeakKey {
                min: Self::MIN_LENGTH,
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}
