//! Driving port for reading comment threads.

use async_trait::async_trait;

use crate::domain::{CommentNode, Error, PostId};

/// Driving port for comment reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentQuery: Send + Sync {
    /// Root comments of a post, oldest first, with nested replies.
    async fn comment_thread(&self, post_id: &PostId) -> Result<Vec<CommentNode>, Error>;
}
