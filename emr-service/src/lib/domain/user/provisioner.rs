use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::user::models::CreateAccountCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::role::resolver::RoleResolver;
use crate::user::errors::UserError;
use crate::user::ports::AccountProvisioning;
use crate::user::ports::CredentialStore;

/// Domain service creating accounts.
///
/// Uniqueness pre-checks are advisory; the store's constraints decide when
/// two requests race on the same username or email.
pub struct AccountProvisioner<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    role_resolver: Arc<RoleResolver<S>>,
    password_hasher: auth::PasswordHasher,
}

impl<S> AccountProvisioner<S>
where
    S: CredentialStore,
{
    /// Create a provisioner with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential persistence implementation
    /// * `role_resolver` - Role label resolution sharing the same store
    pub fn new(store: Arc<S>, role_resolver: Arc<RoleResolver<S>>) -> Self {
        Self {
            store,
            role_resolver,
            password_hasher: auth::PasswordHasher::new(),
        }
    }
}

#[async_trait]
impl<S> AccountProvisioning for AccountProvisioner<S>
where
    S: CredentialStore,
{
    async fn create_account(&self, command: CreateAccountCommand) -> Result<User, UserError> {
        if self.store.exists_by_username(&command.username).await? {
            return Err(UserError::DuplicateUsername(command.username.to_string()));
        }

        if self.store.exists_by_email(&command.email).await? {
            return Err(UserError::DuplicateEmail(command.email.to_string()));
        }

        let password_hash = self.password_hasher.hash(command.password.expose())?;

        let roles = self
            .role_resolver
            .resolve(command.requested_roles.as_ref())
            .await?;

        let user = self
            .store
            .save(NewUser {
                username: command.username,
                email: command.email,
                password_hash,
                roles,
            })
            .await?;

        tracing::info!(
            user_id = %user.id,
            username = %user.username,
            roles = ?user.authorities(),
            "Account created"
        );

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use mockall::mock;
    use mockall::predicate::*;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Password;
    use crate::domain::user::models::UserId;
    use crate::domain::user::models::Username;
    use crate::outbound::repositories::memory::InMemoryCredentialStore;
    use crate::role::models::Role;
    use crate::role::models::RoleName;

    mock! {
        pub TestCredentialStore {}

        #[async_trait]
        impl CredentialStore for TestCredentialStore {
            async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError>;
            async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, UserError>;
            async fn list_roles(&self) -> Result<Vec<Role>, UserError>;
            async fn save(&self, user: NewUser) -> Result<User, UserError>;
        }
    }

    fn provisioner<S: CredentialStore>(store: Arc<S>) -> AccountProvisioner<S> {
        let resolver = Arc::new(RoleResolver::new(Arc::clone(&store)));
        AccountProvisioner::new(store, resolver)
    }

    fn command(
        username: &str,
        email: &str,
        password: &str,
        roles: Option<Vec<&str>>,
    ) -> CreateAccountCommand {
        CreateAccountCommand::new(
            Username::new(username.to_string()).unwrap(),
            EmailAddress::new(email.to_string()).unwrap(),
            Password::new(password.to_string()).unwrap(),
            roles.map(|labels| labels.into_iter().map(String::from).collect()),
        )
    }

    fn role_names(user: &User) -> Vec<RoleName> {
        user.roles.iter().map(|r| r.name).collect()
    }

    #[tokio::test]
    async fn test_create_account_default_role() {
        let store = Arc::new(InMemoryCredentialStore::with_roles(&[RoleName::User]));
        let service = provisioner(Arc::clone(&store));

        let user = service
            .create_account(command("bob", "bob@x.com", "secret1", None))
            .await
            .expect("Failed to create account");

        assert_eq!(user.username.as_str(), "bob");
        assert_eq!(user.email.as_str(), "bob@x.com");
        assert_eq!(role_names(&user), vec![RoleName::User]);
        // Password is hashed with real Argon2, plaintext never stored
        assert!(user.password_hash.starts_with("$argon2"));
        assert!(!user.password_hash.contains("secret1"));
    }

    #[tokio::test]
    async fn test_create_account_repeat_username_fails() {
        let store = Arc::new(InMemoryCredentialStore::with_roles(&[RoleName::User]));
        let service = provisioner(Arc::clone(&store));

        service
            .create_account(command("bob", "bob@x.com", "secret1", None))
            .await
            .unwrap();

        let result = service
            .create_account(command("bob", "other@x.com", "secret2", None))
            .await;

        assert!(matches!(result, Err(UserError::DuplicateUsername(name)) if name == "bob"));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_account_repeat_email_fails() {
        let store = Arc::new(InMemoryCredentialStore::seeded());
        let service = provisioner(Arc::clone(&store));

        service
            .create_account(command("bob", "bob@x.com", "secret1", None))
            .await
            .unwrap();

        let result = service
            .create_account(command("robert", "bob@x.com", "secret2", None))
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(email)) if email == "bob@x.com"));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_account_unrecognized_label_grants_user() {
        let store = Arc::new(InMemoryCredentialStore::seeded());
        let service = provisioner(store);

        let user = service
            .create_account(command(
                "alice",
                "alice@x.com",
                "secret1",
                Some(vec!["admin", "bogus-label"]),
            ))
            .await
            .expect("Unrecognized label must not fail provisioning");

        assert_eq!(role_names(&user), vec![RoleName::Admin, RoleName::User]);
    }

    #[tokio::test]
    async fn test_create_account_all_roles() {
        let store = Arc::new(InMemoryCredentialStore::seeded());
        let service = provisioner(store);

        let user = service
            .create_account(command(
                "carol",
                "carol@x.com",
                "secret1",
                Some(vec!["pharmacist", "admin", "user"]),
            ))
            .await
            .unwrap();

        assert_eq!(
            role_names(&user),
            vec![RoleName::Admin, RoleName::Pharmacist, RoleName::User]
        );
    }

    #[tokio::test]
    async fn test_create_account_missing_role_writes_nothing() {
        let store = Arc::new(InMemoryCredentialStore::with_roles(&[RoleName::User]));
        let service = provisioner(Arc::clone(&store));

        let result = service
            .create_account(command(
                "dave",
                "dave@x.com",
                "secret1",
                Some(vec!["user", "pharmacist"]),
            ))
            .await;

        assert!(matches!(
            result,
            Err(UserError::RoleNotFound(RoleName::Pharmacist))
        ));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_resolved_by_store() {
        let store = Arc::new(InMemoryCredentialStore::seeded());
        let service = Arc::new(provisioner(Arc::clone(&store)));

        let attempts = (0..8).map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service
                    .create_account(command(
                        "racer",
                        &format!("racer{}@x.com", i),
                        "secret1",
                        None,
                    ))
                    .await
            })
        });

        let mut created = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            match attempt.await.unwrap() {
                Ok(_) => created += 1,
                Err(UserError::DuplicateUsername(_)) => {}
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_constraint_violation_at_save_is_duplicate() {
        let mut store = MockTestCredentialStore::new();

        // Pre-checks pass, but another request inserts first.
        store
            .expect_exists_by_username()
            .times(1)
            .returning(|_| Ok(false));
        store
            .expect_exists_by_email()
            .times(1)
            .returning(|_| Ok(false));
        store
            .expect_find_role_by_name()
            .with(eq(RoleName::User))
            .returning(|name| Ok(Some(Role::new(3, name))));
        store.expect_save().times(1).returning(|user| {
            Err(UserError::DuplicateUsername(
                user.username.as_str().to_string(),
            ))
        });

        let service = provisioner(Arc::new(store));
        let result = service
            .create_account(command("bob", "bob@x.com", "secret1", None))
            .await;

        assert!(matches!(result, Err(UserError::DuplicateUsername(_))));
    }

    #[tokio::test]
    async fn test_duplicate_username_checked_before_any_write() {
        let mut store = MockTestCredentialStore::new();

        store
            .expect_exists_by_username()
            .times(1)
            .returning(|_| Ok(true));
        store.expect_exists_by_email().times(0);
        store.expect_find_role_by_name().times(0);
        store.expect_save().times(0);

        let service = provisioner(Arc::new(store));
        let result = service
            .create_account(command("bob", "bob@x.com", "secret1", None))
            .await;

        assert!(matches!(result, Err(UserError::DuplicateUsername(_))));
    }

    #[tokio::test]
    async fn test_save_receives_hash_and_roles() {
        let mut store = MockTestCredentialStore::new();

        store.expect_exists_by_username().returning(|_| Ok(false));
        store.expect_exists_by_email().returning(|_| Ok(false));
        store
            .expect_find_role_by_name()
            .returning(|name| Ok(Some(Role::new(1, name))));
        store
            .expect_save()
            .withf(|user| {
                user.username.as_str() == "testuser"
                    && user.email.as_str() == "test@example.com"
                    && user.password_hash.starts_with("$argon2")
                    && user.roles == BTreeSet::from([Role::new(1, RoleName::Pharmacist)])
            })
            .times(1)
            .returning(|user| Ok(user.into_user(UserId(42))));

        let service = provisioner(Arc::new(store));
        let user = service
            .create_account(command(
                "testuser",
                "test@example.com",
                "password123",
                Some(vec!["pharmacist"]),
            ))
            .await
            .unwrap();

        assert_eq!(user.id, UserId(42));
    }
}
