//! Authentication primitives
//!
//! Storage-agnostic building blocks for the EMR back end:
//! - Password hashing (Argon2id)
//! - Signed, time-bounded access tokens (HS256 JWT)
//!
//! Services own user lookup and role resolution and compose these pieces.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{SigningKey, TokenService};
//! use chrono::Duration;
//!
//! let key = SigningKey::from_secret(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let tokens = TokenService::new(key, Duration::hours(24));
//!
//! let issued = tokens.issue("alice", &["USER".to_string()]).unwrap();
//! let claims = tokens.validate(&issued.token).unwrap();
//! assert_eq!(claims.subject(), "alice");
//! assert!(claims.has_authority("USER"));
//! ```

pub mod password;
pub mod token;

pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::IssuedToken;
pub use token::SigningKey;
pub use token::TokenClaims;
pub use token::TokenError;
pub use token::TokenService;
