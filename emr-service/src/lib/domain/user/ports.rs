use async_trait::async_trait;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::CreateAccountCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::role::models::Role;
use crate::role::models::RoleName;
use crate::user::errors::UserError;

/// Port for account provisioning.
#[async_trait]
pub trait AccountProvisioning: Send + Sync + 'static {
    /// Create a new account with resolved roles.
    ///
    /// # Arguments
    /// * `command` - Validated username, email, password and requested role labels
    ///
    /// # Returns
    /// Persisted user entity holding at least one role
    ///
    /// # Errors
    /// * `DuplicateUsername` - Username is already taken
    /// * `DuplicateEmail` - Email is already registered
    /// * `RoleNotFound` - A role reference row is missing
    /// * `DatabaseError` - Store operation failed
    async fn create_account(&self, command: CreateAccountCommand) -> Result<User, UserError>;
}

/// Port for credential verification and token issuance.
#[async_trait]
pub trait Authentication: Send + Sync + 'static {
    /// Verify a username/password pair and issue an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `Password` - Stored hash could not be parsed
    /// * `Token` - Token signing failed
    /// * `DatabaseError` - Store operation failed
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, UserError>;
}

/// Persistence operations for users and role reference rows.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Whether any user holds `username`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError>;

    /// Whether any user holds `email`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;

    /// Retrieve user, with roles, by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve the reference row for a role name.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, UserError>;

    /// Retrieve every role reference row.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_roles(&self) -> Result<Vec<Role>, UserError>;

    /// Persist a new user and its role links in one write.
    ///
    /// The store's own uniqueness constraints are authoritative; a violation
    /// is reported even if an earlier existence check passed.
    ///
    /// # Returns
    /// Persisted user with its assigned id
    ///
    /// # Errors
    /// * `DuplicateUsername` - Username is already taken
    /// * `DuplicateEmail` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn save(&self, user: NewUser) -> Result<User, UserError>;
}
