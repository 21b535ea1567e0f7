pub mod claims;
pub mod errors;
pub mod key;
pub mod service;

pub use claims::TokenClaims;
pub use errors::TokenError;
pub use key::SigningKey;
pub use service::IssuedToken;
pub use service::TokenService;
