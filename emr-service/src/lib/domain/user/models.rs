use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use auth::IssuedToken;

use crate::role::models::Role;
use crate::role::models::RoleName;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// Represents a provisioned account. `roles` is never empty once persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

impl User {
    /// Role names in authority form, sorted and deduplicated.
    pub fn authorities(&self) -> Vec<String> {
        self.roles
            .iter()
            .map(|role| role.name)
            .collect::<BTreeSet<RoleName>>()
            .into_iter()
            .map(|name| name.as_str().to_string())
            .collect()
    }

    pub fn has_role(&self, name: RoleName) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }
}

/// Account ready to be persisted; the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: Username,
    pub email: EmailAddress,
    pub password_hash: String,
    pub roles: BTreeSet<Role>,
}

impl NewUser {
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            roles: self.roles,
        }
    }
}

/// Store-assigned numeric user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is non-blank and 3-20 characters long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 20;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `Blank` - Username is empty or whitespace only
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 20 characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        if username.trim().is_empty() {
            return Err(UsernameError::Blank);
        }

        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(username))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser, capped at 64 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    const MAX_LENGTH: usize = 64;

    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `Blank` - Email is empty or whitespace only
    /// * `TooLong` - Email longer than 64 characters
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        if email.trim().is_empty() {
            return Err(EmailError::Blank);
        }

        let length = email.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password accepted for a new account.
///
/// Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 6;
    const MAX_LENGTH: usize = 40;

    /// # Errors
    /// * `Blank` - Password is empty or whitespace only
    /// * `TooShort` - Password shorter than 6 characters
    /// * `TooLong` - Password longer than 40 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.trim().is_empty() {
            return Err(PasswordPolicyError::Blank);
        }

        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Command to provision a new account with domain types
#[derive(Debug, Clone)]
pub struct CreateAccountCommand {
    pub username: Username,
    pub email: EmailAddress,
    pub password: Password,
    /// Client role labels; `None` when the request named no roles
    pub requested_roles: Option<BTreeSet<String>>,
}

impl CreateAccountCommand {
    pub fn new(
        username: Username,
        email: EmailAddress,
        password: Password,
        requested_roles: Option<BTreeSet<String>>,
    ) -> Self {
        Self {
            username,
            email,
            password,
            requested_roles,
        }
    }
}

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub token: IssuedToken,
    pub user: User,
    pub authorities: Vec<String>,
}
