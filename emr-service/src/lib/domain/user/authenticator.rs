use std::sync::Arc;

use async_trait::async_trait;
use auth::TokenService;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::Authentication;
use crate::user::ports::CredentialStore;

/// Domain service turning a username/password pair into an access token.
///
/// Read-only against the store. Unknown usernames and wrong passwords are
/// indistinguishable to the caller.
pub struct Authenticator<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    password_hasher: auth::PasswordHasher,
    token_service: Arc<TokenService>,
}

impl<S> Authenticator<S>
where
    S: CredentialStore,
{
    /// Create an authenticator with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential persistence implementation
    /// * `token_service` - Token issuer owning the signing key
    pub fn new(store: Arc<S>, token_service: Arc<TokenService>) -> Self {
        Self {
            store,
            password_hasher: auth::PasswordHasher::new(),
            token_service,
        }
    }
}

#[async_trait]
impl<S> Authentication for Authenticator<S>
where
    S: CredentialStore,
{
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, UserError> {
        // A name that could never have been provisioned cannot match a user.
        let user = match Username::new(username.to_string()) {
            Ok(username) => self.store.find_by_username(&username).await?,
            Err(_) => None,
        };

        let Some(user) = user else {
            self.password_hasher.verify_decoy(password);
            tracing::debug!("Login rejected");
            return Err(UserError::InvalidCredentials);
        };

        if !self.password_hasher.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login rejected");
            return Err(UserError::InvalidCredentials);
        }

        let authorities = user.authorities();
        let token = self
            .token_service
            .issue(user.username.as_str(), &authorities)?;

        tracing::info!(user_id = %user.id, roles = ?authorities, "Login succeeded");

        Ok(AuthenticatedSession {
            token,
            user,
            authorities,
        })
    }
}
