//! Account roles and credential rules
//!
//! `Role` is totally ordered: `Regular < Moderator < Admin`. A caller
//! holding a role satisfies every requirement at or below it, which is
//! what `backend::auth::policy` relies on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Shortest accepted username
pub const USERNAME_MIN_LEN: usize = 3;
/// Longest accepted username
pub const USERNAME_MAX_LEN: usize = 50;
/// Shortest accepted password
pub const PASSWORD_MIN_LEN: usize = 6;
/// bcrypt only reads the first 72 bytes of its input
pub const PASSWORD_MAX_LEN: usize = 72;

/// Account role
///
/// Declaration order defines the ordering used for authorization.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default role for every account after the first
    #[default]
    #[serde(alias = "user")]
    Regular,
    /// May delete any comment
    Moderator,
    /// May do anything, including changing roles
    Admin,
}

impl Role {
    /// All roles, lowest first
    pub const ALL: [Role; 3] = [Role::Regular, Role::Moderator, Role::Admin];

    /// Wire and storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Regular => "regular",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }

    /// Whether this role meets `required`
    pub fn satisfies(self, required: Role) -> bool {
        self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" | "user" => Ok(Role::Regular),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(SharedError::validation(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Check username length (in characters)
pub fn validate_username(username: &str) -> Result<(), SharedError> {
    let len = username.trim().chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(SharedError::validation(
            "username",
            format!(
                "Username must be {}-{} characters",
                USERNAME_MIN_LEN, USERNAME_MAX_LEN
            ),
        ));
    }
    Ok(())
}

/// Basic shape check: one '@' with a non-empty local part and a dotted domain
pub fn validate_email(email: &str) -> Result<(), SharedError> {
    let invalid = || SharedError::validation("email", "Invalid email format");
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(())
}

/// Check password length (in bytes, since that is what bcrypt consumes)
pub fn validate_password(password: &str) -> Result<(), SharedError> {
    if password.len() < PASSWORD_MIN_LEN || password.len() > PASSWORD_MAX_LEN {
        return Err(SharedError::validation(
            "password",
            format!(
                "Password must be {}-{} characters",
                PASSWORD_MIN_LEN, PASSWORD_MAX_LEN
            ),
        ));
    }
    Ok(())
}
