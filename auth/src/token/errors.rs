use thiserror::Error;

/// Error type for token issuance and validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Signing key too short: minimum {min} bytes, got {actual}")]
    WeakKey { min: usize, actual: usize },

    #[error("Failed to sign token: {0}")]
    EncodingFailed(String),

    #[error("Token is invalid: {0}")]
    InvalidToken(String),

    #[error("Token is expired")]
    ExpiredToken,
}
