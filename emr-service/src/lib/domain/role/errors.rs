use thiserror::Error;

/// Error for parsing a stored role name
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleNameError {
    #[error("Unknown role name: {0}")]
    Unknown(String),
}
