//! Driving port for writing comments.

use async_trait::async_trait;

use crate::domain::{CommentId, CommentView, Error, PostId, UserId};

/// Comment submitted by an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateComment {
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub parent_id: Option<CommentId>,
}

/// Driving port for comment mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentCommand: Send + Sync {
    /// Add a comment, optionally as a reply.
    ///
    /// # Errors
    ///
    /// `not_found` for an unknown post or parent, `invalid_request` when the
    /// parent belongs to another post.
    async fn create_comment(&self, request: CreateComment) -> Result<CommentView, Error>;
}
