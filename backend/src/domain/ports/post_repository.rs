//! Port abstraction for posts, their tag links and likes.
use async_trait::async_trait;

use crate::domain::{Keywords, NewPost, Page, Pagination, Post, PostId, PostSummary, TagId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by post repository adapters.
    pub enum PostPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable: "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError: "post repository query failed: {message}",
        /// The post vanished between lookup and mutation.
        NotFound { post_id: String } => NotFound: "post {post_id} does not exist",
        /// The liking account no longer exists.
        UnknownUser { user_id: String } => NotFound: "user {user_id} does not exist",
    }
}

/// Driven port for posts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post and return the stored row.
    async fn create(&self, post: &NewPost) -> Result<Post, PostPersistenceError>;

    /// Link a post to tags.
    async fn attach_tags(&self, post_id: &PostId, tag_ids: &[TagId])
    -> Result<(), PostPersistenceError>;

    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError>;

    /// Newest posts first, filtered by keywords when any are given.
    async fn list(
        &self,
        keywords: &Keywords,
        pagination: Pagination,
    ) -> Result<Page<PostSummary>, PostPersistenceError>;

    /// Newest posts of one author first.
    async fn list_by_author(
        &self,
        author_id: &UserId,
        pagination: Pagination,
    ) -> Result<Page<PostSummary>, PostPersistenceError>;

    /// Record a like. Returns `false` when the user already liked the post.
    async fn add_like(&self, post_id: &PostId, user_id: &UserId)
    -> Result<bool, PostPersistenceError>;

    /// Number of likes on a post.
    async fn like_count(&self, post_id: &PostId) -> Result<u64, PostPersistenceError>;

    /// Remove the post with its likes and tag links. Returns `false` when no
    /// post matched.
    async fn delete(&self, id: &PostId) -> Result<bool, PostPersistenceError>;
}
