//! Driving port for account registration and login.

use async_trait::async_trait;

use crate::domain::{AddressInput, Email, Error, Password, UserProfile, Username};

use super::AccessToken;

/// Registration input after HTTP parsing.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: Username,
    pub email: Email,
    pub password: Password,
    pub age: Option<i32>,
    pub address: Option<AddressInput>,
}

/// Login input after HTTP parsing.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: Email,
    pub password: Password,
}

/// Successful login.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginResponse {
    pub token: AccessToken,
    pub profile: UserProfile,
}

/// Driving port for account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account, and its address when one is supplied, atomically.
    ///
    /// # Errors
    ///
    /// `conflict` when the email is taken, `not_found` when the address
    /// references an unknown city.
    async fn register(&self, request: RegisterRequest) -> Result<UserProfile, Error>;

    /// Check credentials and issue an access token.
    ///
    /// # Errors
    ///
    /// `unauthorized` for an unknown email or a wrong password; both cases
    /// share one message.
    async fn login(&self, request: LoginRequest) -> Result<LoginResponse, Error>;
}
