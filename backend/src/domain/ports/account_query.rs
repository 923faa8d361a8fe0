//! Driving port for reading accounts.

use async_trait::async_trait;

use crate::domain::{Error, UserId, UserProfile};

/// Driving port for account reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Profile of `user_id`, including the resolved address.
    async fn get_user(&self, user_id: &UserId) -> Result<UserProfile, Error>;
}
