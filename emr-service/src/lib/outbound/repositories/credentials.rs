use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::CredentialStore;
use crate::role::models::Role;
use crate::role::models::RoleName;
use crate::user::errors::UserError;

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn roles_of(&self, user_id: i64) -> Result<BTreeSet<Role>, UserError> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        rows.iter().map(role_from_row).collect()
    }
}

fn role_from_row(row: &PgRow) -> Result<Role, UserError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;
    let name = name
        .parse::<RoleName>()
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

    Ok(Role::new(id, name))
}

fn map_insert_error(e: sqlx::Error, user: &NewUser) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if db_err.constraint() == Some(USERNAME_CONSTRAINT) {
                return UserError::DuplicateUsername(user.username.to_string());
            }
            if db_err.constraint() == Some(EMAIL_CONSTRAINT) {
                return UserError::DuplicateEmail(user.email.to_string());
            }
        }
    }
    UserError::DatabaseError(e.to_string())
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn exists_by_username(&self, username: &Username) -> Result<bool, UserError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }

    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let Some(r) = row else {
            return Ok(None);
        };

        let id: i64 = r
            .try_get("id")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;
        let stored_username: String = r
            .try_get("username")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;
        let email: String = r
            .try_get("email")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;
        let password_hash: String = r
            .try_get("password_hash")
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(Some(User {
            id: UserId(id),
            username: Username::new(stored_username)?,
            email: EmailAddress::new(email)?,
            password_hash,
            roles: self.roles_of(id).await?,
        }))
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>, UserError> {
        let row = sqlx::query("SELECT id, name FROM roles WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        row.as_ref().map(role_from_row).transpose()
    }

    async fn list_roles(&self) -> Result<Vec<Role>, UserError> {
        let rows = sqlx::query("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        rows.iter().map(role_from_row).collect()
    }

    async fn save(&self, user: NewUser) -> Result<User, UserError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, &user))?;

        for role in &user.roles {
            sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
                .bind(id)
                .bind(role.id.0)
                .execute(&mut *tx)
                .await
                .map_err(|e| UserError::DatabaseError(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(user.into_user(UserId(id)))
    }
}
