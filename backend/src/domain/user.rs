//! User accounts and their credentials.

use std::fmt;

use chrono::{DateTime, Utc};

use super::password::PasswordDigest;
use super::{AddressId, Address, City, UserId};

/// Validation errors raised while building account values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The username was blank.
    #[error("username must not be empty")]
    EmptyUsername,
    /// The email address was blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// The stored role did not match a known value.
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

/// Name shown next to posts and comments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Trim and validate a username.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Login identifier. Unique across accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Trim and validate an email address.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authorisation role attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    /// Regular member.
    #[default]
    Normal,
    /// Operator account created from configuration.
    Admin,
}

impl Role {
    /// Stable string form stored in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Admin => "admin",
        }
    }

    /// Parse the stored string form.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        match raw {
            "normal" => Ok(Self::Normal),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Persisted user account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_digest: PasswordDigest,
    pub age: Option<i32>,
    pub address_id: Option<AddressId>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values required to insert a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub password_digest: PasswordDigest,
    pub age: Option<i32>,
    pub address_id: Option<AddressId>,
    pub role: Role,
}

/// Address resolved together with its city.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub address: Address,
    pub city: City,
}

/// Account view returned to clients; never carries the password digest.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub username: Username,
    pub email: Email,
    pub age: Option<i32>,
    pub role: Role,
    pub address: Option<ResolvedAddress>,
}

impl UserProfile {
    /// Build a profile from a stored user and its optional address.
    pub fn from_user(user: User, address: Option<ResolvedAddress>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            age: user.age,
            role: user.role,
            address,
        }
    }
}
