use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::CredentialStore;
use crate::role::models::Role;
use crate::role::models::RoleName;
use crate::user::errors::UserError;

/// Process-local credential store.
///
/// Enforces the same username/email uniqueness as the database schema,
/// checked and applied under one write lock.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    roles: HashMap<RoleName, Role>,
    next_user_id: i64,
}

impl InMemoryCredentialStore {
    /// Empty store without any role reference rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding reference rows for `names` only, ids assigned from 1.
    pub fn with_roles(names: &[RoleName]) -> Self {
        let roles = names
            .iter()
            .zip(1..)
            .map(|(name, id)| (*name, Role::new(id, *name)))
            .collect();

        Self {
            state: RwLock::new(State {
                users: Vec::new(),
                roles,
                next_user_id: 0,
            }),
        }
    }

    /// Store holding a reference row for every role.
    pub fn seeded() -> Self {
        Self::with_roles(&RoleName::ALL)
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError> {
        let state = self.state.read().await;
        Ok(state.users.iter().any(|u| &u.username == username))
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        let state = self.state.read().await;
        Ok(state.users.iter().any(|u| &u.email == email))
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, UserError> {
        Ok(self.state.read().await.roles.get(&name).cloned())
    }

    async fn list_roles(&self) -> Result<Vec<Role>, UserError> {
        let mut roles: Vec<Role> = self.state.read().await.roles.values().cloned().collect();
        roles.sort();
        Ok(roles)
    }

    async fn save(&self, user: NewUser) -> Result<User, UserError> {
        let mut state = self.state.write().await;

        if state.users.iter().any(|u| u.username == user.username) {
            return Err(UserError::DuplicateUsername(user.username.to_string()));
        }
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email.to_string()));
        }

        state.next_user_id += 1;
        let user = user.into_user(UserId(state.next_user_id));
        state.users.push(user.clone());

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            roles: BTreeSet::from([Role::new(3, RoleName::User)]),
        }
    }

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let store = InMemoryCredentialStore::seeded();

        let first = store.save(new_user("alice", "alice@x.com")).await.unwrap();
        let second = store.save(new_user("bob", "bob@x.com")).await.unwrap();

        assert_eq!(first.id, UserId(1));
        assert_eq!(second.id, UserId(2));

        let found = store
            .find_by_username(&Username::new("bob".to_string()).unwrap())
            .await
            .unwrap();
        assert_eq!(found, Some(second));
    }

    #[tokio::test]
    async fn test_save_enforces_uniqueness() {
        let store = InMemoryCredentialStore::seeded();
        store.save(new_user("alice", "alice@x.com")).await.unwrap();

        let same_name = store.save(new_user("alice", "other@x.com")).await;
        let same_email = store.save(new_user("alicia", "alice@x.com")).await;

        assert!(matches!(same_name, Err(UserError::DuplicateUsername(_))));
        assert!(matches!(same_email, Err(UserError::DuplicateEmail(_))));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_existence_checks() {
        let store = InMemoryCredentialStore::seeded();
        store.save(new_user("alice", "alice@x.com")).await.unwrap();

        let alice = Username::new("alice".to_string()).unwrap();
        let bob = Username::new("bob".to_string()).unwrap();
        assert!(store.exists_by_username(&alice).await.unwrap());
        assert!(!store.exists_by_username(&bob).await.unwrap());

        let email = EmailAddress::new("alice@x.com".to_string()).unwrap();
        assert!(store.exists_by_email(&email).await.unwrap());
    }

    #[tokio::test]
    async fn test_role_rows() {
        let store = InMemoryCredentialStore::with_roles(&[RoleName::User]);

        assert_eq!(
            store.find_role_by_name(RoleName::User).await.unwrap(),
            Some(Role::new(1, RoleName::User))
        );
        assert_eq!(store.find_role_by_name(RoleName::Admin).await.unwrap(), None);
        assert_eq!(store.list_roles().await.unwrap().len(), 1);
        assert!(InMemoryCredentialStore::new()
            .list_roles()
            .await
            .unwrap()
            .is_empty());
    }
}
