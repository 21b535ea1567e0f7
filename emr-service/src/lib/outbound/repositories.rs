pub mod credentials;
pub mod memory;

pub use credentials::PostgresCredentialStore;
pub use memory::InMemoryCredentialStore;
