//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, CityQuery, CommentCommand, CommentQuery, PostCommand, PostQuery,
    TokenService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub cities: Arc<dyn CityQuery>,
    pub posts: Arc<dyn PostCommand>,
    pub posts_query: Arc<dyn PostQuery>,
    pub comments: Arc<dyn CommentCommand>,
    pub comments_query: Arc<dyn CommentQuery>,
    pub tokens: Arc<dyn TokenService>,
}
