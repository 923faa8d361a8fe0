//! Driving port for post mutations.

use async_trait::async_trait;

use crate::domain::{Error, PostId, PostSummary, PublishPost, UserId};

/// Result of liking a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    /// `false` when the user had already liked the post.
    pub newly_liked: bool,
    pub like_count: u64,
}

/// Driving port for post mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCommand: Send + Sync {
    /// Publish a post and link its tags, creating missing tags, atomically.
    async fn create_post(&self, request: PublishPost) -> Result<PostSummary, Error>;

    /// Like a post. Repeated likes by the same user are ignored.
    async fn like_post(&self, post_id: &PostId, user_id: &UserId) -> Result<LikeOutcome, Error>;

    /// Delete a post together with its comments, likes and tag links.
    ///
    /// # Errors
    ///
    /// `not_found` for an unknown post, `forbidden` when `user_id` is not the
    /// author.
    async fn delete_post(&self, post_id: &PostId, user_id: &UserId) -> Result<(), Error>;
}
