//! Driving port for post listings.

use async_trait::async_trait;

use crate::domain::{Error, Keywords, Page, Pagination, PostSummary, UserId};

/// Driving port for post reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostQuery: Send + Sync {
    /// Newest posts first; keywords match username, content or tag name.
    async fn list_posts(
        &self,
        keywords: Keywords,
        pagination: Pagination,
    ) -> Result<Page<PostSummary>, Error>;

    /// Newest posts of one author first. The author must exist.
    async fn posts_by_author(
        &self,
        author_id: &UserId,
        pagination: Pagination,
    ) -> Result<Page<PostSummary>, Error>;
}
