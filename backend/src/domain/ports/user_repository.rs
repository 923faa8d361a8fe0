//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable: "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError: "user repository query failed: {message}",
        /// Another account already uses the email address.
        DuplicateEmail { email: String } => Conflict: "email {email} is already registered",
    }
}

/// Driven port for user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account and return the stored row.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by login email.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;
}
