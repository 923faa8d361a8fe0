//! Driven port for signed access tokens.
use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Failures raised while issuing or verifying tokens.
    pub enum TokenError {
        /// Signature, structure or expiry check failed.
        Invalid { reason: String } => Unauthorized: "invalid token",
        /// The token could not be signed.
        Signing { message: String } => InternalError: "failed to sign access token: {message}",
    }
}

/// Signed bearer token handed to clients after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies bearer tokens carrying a user id and an expiry.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token for `user_id`.
    fn issue(&self, user_id: &UserId) -> Result<AccessToken, TokenError>;

    /// Check signature and expiry and return the embedded user id.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
