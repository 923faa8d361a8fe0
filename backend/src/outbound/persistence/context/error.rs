//! Failures raised by the request-scoped context.

use crate::domain::Error;

/// Errors raised while resolving the active handle or driving a transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// No context is installed for the current task.
    #[error("no request database context is installed")]
    Missing,
    /// The transaction connection is lent to another operation.
    #[error("transaction connection is already in use")]
    Busy,
    /// A nested transaction was dropped before it finished, leaving the
    /// enclosing transaction in an unknown state.
    #[error("transaction connection was abandoned by a cancelled nested transaction")]
    Abandoned,
    /// No connection could be checked out.
    #[error("failed to acquire a database connection: {message}")]
    Checkout { message: String },
    /// `BEGIN` or `SAVEPOINT` failed.
    #[error("failed to begin transaction: {message}")]
    Begin { message: String },
    /// `COMMIT` or `RELEASE SAVEPOINT` failed.
    #[error("failed to commit transaction: {message}")]
    Commit { message: String },
    /// `ROLLBACK` or `ROLLBACK TO SAVEPOINT` failed.
    #[error("failed to roll back transaction: {message}")]
    Rollback { message: String },
}

impl ContextError {
    /// Build a checkout error.
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    /// Build a begin error.
    pub fn begin(message: impl Into<String>) -> Self {
        Self::Begin {
            message: message.into(),
        }
    }

    /// Build a commit error.
    pub fn commit(message: impl Into<String>) -> Self {
        Self::Commit {
            message: message.into(),
        }
    }

    /// Build a rollback error.
    pub fn rollback(message: impl Into<String>) -> Self {
        Self::Rollback {
            message: message.into(),
        }
    }
}

impl From<ContextError> for Error {
    fn from(value: ContextError) -> Self {
        match value {
            ContextError::Checkout { .. } => Error::service_unavailable(value.to_string()),
            other => Error::internal(other.to_string()),
        }
    }
}

/// Lift context failures into a port error's `Connection` or `Query` variant.
macro_rules! context_error_into_port_error {
    ($($port:ty),* $(,)?) => {
        $(
            impl From<$crate::outbound::persistence::context::ContextError> for $port {
                fn from(value: $crate::outbound::persistence::context::ContextError) -> Self {
                    use $crate::outbound::persistence::context::ContextError;
                    match value {
                        ContextError::Checkout { .. } => Self::connection(value.to_string()),
                        other => Self::query(other.to_string()),
                    }
                }
            }
        )*
    };
}

context_error_into_port_error!(
    crate::domain::ports::UserPersistenceError,
    crate::domain::ports::AddressPersistenceError,
    crate::domain::ports::CityPersistenceError,
    crate::domain::ports::TagPersistenceError,
    crate::domain::ports::PostPersistenceError,
    crate::domain::ports::CommentPersistenceError,
);
