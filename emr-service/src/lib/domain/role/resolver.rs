use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::role::models::Role;
use crate::role::models::RoleLabel;
use crate::role::models::RoleName;
use crate::user::errors::UserError;
use crate::user::ports::CredentialStore;

/// Maps requested role labels to role reference rows.
///
/// Rows are cached per [`RoleName`] after the first successful lookup, so the
/// store is queried at most once per role for the life of the resolver.
pub struct RoleResolver<S>
where
    S: CredentialStore,
{
    store: Arc<S>,
    table: RwLock<HashMap<RoleName, Role>>,
}

impl<S> RoleResolver<S>
where
    S: CredentialStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            table: RwLock::new(HashMap::new()),
        }
    }

    /// Fill the lookup table from the store.
    ///
    /// # Returns
    /// Role names with no reference row
    ///
    /// # Errors
    /// * `DatabaseError` - Store operation failed
    pub async fn preload(&self) -> Result<Vec<RoleName>, UserError> {
        let roles = self.store.list_roles().await?;

        let mut table = self.table.write().await;
        for role in roles {
            table.insert(role.name, role);
        }

        let missing: Vec<RoleName> = RoleName::ALL
            .into_iter()
            .filter(|name| !table.contains_key(name))
            .collect();

        for name in &missing {
            tracing::error!(role = %name, "Role reference row missing from store");
        }

        Ok(missing)
    }

    /// Resolve requested labels into a non-empty role set.
    ///
    /// `None` or an empty set yields `{USER}`. `"admin"` and `"pharmacist"`
    /// map to their roles and every other label maps to USER. Resolution is
    /// all-or-nothing: one missing reference row fails the whole call.
    ///
    /// # Errors
    /// * `RoleNotFound` - A needed reference row is absent
    /// * `DatabaseError` - Store operation failed
    pub async fn resolve(
        &self,
        requested: Option<&BTreeSet<String>>,
    ) -> Result<BTreeSet<Role>, UserError> {
        let mut names: BTreeSet<RoleName> = requested
            .into_iter()
            .flatten()
            .map(|label| {
                let parsed = RoleLabel::parse(label);
                if let RoleLabel::Unrecognized(raw) = parsed {
                    tracing::warn!(label = %raw, "Unrecognized role label, granting USER");
                }
                parsed.role_name()
            })
            .collect();

        if names.is_empty() {
            names.insert(RoleName::User);
        }

        let mut roles = BTreeSet::new();
        for name in names {
            roles.insert(self.role(name).await?);
        }

        Ok(roles)
    }

    async fn role(&self, name: RoleName) -> Result<Role, UserError> {
        let cached = self.table.read().await.get(&name).cloned();
        if let Some(role) = cached {
            return Ok(role);
        }

        let role = self.store.find_role_by_name(name).await?.ok_or_else(|| {
            tracing::error!(role = %name, "Role reference row missing from store");
            UserError::RoleNotFound(name)
        })?;

        self.table.write().await.insert(name, role.clone());
        Ok(role)
    }
}
