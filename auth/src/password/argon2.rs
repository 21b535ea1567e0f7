use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use super::errors::PasswordError;

/// Hash verified when the account being authenticated does not exist.
static DECOY_HASH: OnceLock<Option<String>> = OnceLock::new();

/// One-way salted password hashing (Argon2id).
///
/// Hashes are emitted in PHC string format, so the algorithm parameters and
/// the salt travel with the stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a hasher with the Argon2id default parameters.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    /// * `HashingFailed` - Argon2 rejected the input or parameters
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Check a plaintext password against a stored PHC hash.
    ///
    /// The digest comparison is constant-time. A mismatch is `Ok(false)`,
    /// only an unparseable stored hash is an error.
    ///
    /// # Errors
    /// * `MalformedHash` - Stored hash is not a valid PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Spend one verification on a throwaway hash.
    ///
    /// Callers use this on the unknown-account path so it costs the same as
    /// a real password mismatch. Always returns `false`.
    pub fn verify_decoy(&self, password: &str) -> bool {
        let decoy = DECOY_HASH.get_or_init(|| self.hash("decoy-password-never-matches").ok());

        if let Some(hash) = decoy {
            let _ = self.verify(password, hash);
        }
        false
    }
}
