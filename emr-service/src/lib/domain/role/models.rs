use std::fmt;
use std::str::FromStr;

use crate::role::errors::RoleNameError;

/// Closed set of permission classes a user can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoleName {
    Admin,
    Pharmacist,
    User,
}

impl RoleName {
    pub const ALL: [RoleName; 3] = [RoleName::Admin, RoleName::Pharmacist, RoleName::User];

    /// Stored and authority form, e.g. `"ADMIN"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::Admin => "ADMIN",
            RoleName::Pharmacist => "PHARMACIST",
            RoleName::User => "USER",
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = RoleNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(RoleName::Admin),
            "PHARMACIST" => Ok(RoleName::Pharmacist),
            "USER" => Ok(RoleName::User),
            other => Err(RoleNameError::Unknown(other.to_string())),
        }
    }
}

/// Role label as a client spells it in a provisioning request.
///
/// Only the lowercase labels are recognized. Anything else, including
/// `"ADMIN"` or a typo, is `Unrecognized` and grants `USER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleLabel<'a> {
    Admin,
    Pharmacist,
    User,
    Unrecognized(&'a str),
}

impl<'a> RoleLabel<'a> {
    pub fn parse(label: &'a str) -> Self {
        match label {
            "admin" => RoleLabel::Admin,
            "pharmacist" => RoleLabel::Pharmacist,
            "user" => RoleLabel::User,
            other => RoleLabel::Unrecognized(other),
        }
    }

    pub fn role_name(&self) -> RoleName {
        match self {
            RoleLabel::Admin => RoleName::Admin,
            RoleLabel::Pharmacist => RoleName::Pharmacist,
            RoleLabel::User | RoleLabel::Unrecognized(_) => RoleName::User,
        }
    }
}

/// Role reference row identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleId(pub i64);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role reference entity.
///
/// One row exists per [`RoleName`]; rows are created outside the service
/// and never modified by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
}

impl Role {
    pub fn new(id: i64, name: RoleName) -> Self {
        Self {
            id: RoleId(id),
            name,
        }
    }
}
