//! Port abstraction for tags.
use async_trait::async_trait;

use crate::domain::Tag;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by tag repository adapters.
    pub enum TagPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable: "tag repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError: "tag repository query failed: {message}",
    }
}

/// Driven port for tags.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Tags whose name is in `names`. Unknown names are skipped.
    async fn find_by_names(&self, names: &[String]) -> Result<Vec<Tag>, TagPersistenceError>;

    /// Insert new tags. Names that already exist, including ones committed
    /// concurrently, are skipped and keep their stored identifier.
    async fn create_all(&self, tags: &[Tag]) -> Result<(), TagPersistenceError>;
}
