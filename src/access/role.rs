use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caller role carried in every session token.
///
/// Roles are flat: nothing inherits from anything else. Each operation names
/// the roles it admits through a [`RoleSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operator,
    User,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid role: {0}")]
pub struct InvalidRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Operator, Role::User];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Operator => "operator",
            Role::User => "user",
        }
    }

    /// Staff may act on any ticket or comment.
    pub fn is_staff(&self) -> bool {
        RoleSet::STAFF.contains(*self)
    }

    /// Role granted to a self-registered account.
    ///
    /// Whatever the client asked for, known or not, self-registration always
    /// yields `User`. Staff roles are granted by an admin afterwards.
    pub fn for_registration(requested: Option<&str>) -> Role {
        if let Some(requested) = requested {
            match requested.parse::<Role>() {
                Ok(Role::User) | Err(_) => {}
                Ok(role) => tracing::info!("registration requested role '{}', downgraded to user", role),
            }
        }
        Role::User
    }

    const fn bit(self) -> u8 {
        match self {
            Role::Admin => 0b001,
            Role::Operator => 0b010,
            Role::User => 0b100,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InvalidRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "operator" => Ok(Role::Operator),
            "user" => Ok(Role::User),
            other => Err(InvalidRole(other.to_string())),
        }
    }
}

/// Allow-set of roles for one operation.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const ADMIN: RoleSet = RoleSet::of(&[Role::Admin]);
    pub const STAFF: RoleSet = RoleSet::of(&[Role::Admin, Role::Operator]);
    pub const AUTHENTICATED: RoleSet = RoleSet::of(&Role::ALL);

    pub const fn of(roles: &[Role]) -> RoleSet {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= roles[i].bit();
            i += 1;
        }
        RoleSet(bits)
    }

    pub const fn contains(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn roles(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.roles()).finish()
    }
}
