//! Port abstraction for comments.
use async_trait::async_trait;

use crate::domain::{Comment, CommentId, CommentView, NewComment, PostId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by comment repository adapters.
    pub enum CommentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable: "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError: "comment repository query failed: {message}",
    }
}

/// Driven port for comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment and return the stored row.
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentPersistenceError>;

    /// Fetch a comment by identifier.
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, CommentPersistenceError>;

    /// Every comment on a post with the commenter's username, in no
    /// particular order.
    async fn list_for_post(&self, post_id: &PostId)
    -> Result<Vec<CommentView>, CommentPersistenceError>;

    /// Remove every comment on a post. Returns the number removed.
    async fn delete_for_post(&self, post_id: &PostId) -> Result<usize, CommentPersistenceError>;
}
