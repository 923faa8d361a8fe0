//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories are stateless. Every operation resolves the request's
//! [`DbContext`] and runs on whatever handle is active there: the pinned
//! transaction connection inside a unit of work, or a short-lived pooled
//! connection otherwise.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use social_backend::outbound::persistence::{DbContext, DbPool, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/social")).await?;
//! let ctx = Arc::new(DbContext::new(pool));
//! ctx.scope(async { /* repository calls */ }).await;
//! ```

pub mod context;
mod diesel_address_repository;
mod diesel_city_repository;
mod diesel_comment_repository;
pub(crate) mod diesel_error_mapping;
mod diesel_post_repository;
mod diesel_tag_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;
mod unit_of_work;

pub use context::{ContextError, DbContext};
pub use diesel_address_repository::DieselAddressRepository;
pub use diesel_city_repository::DieselCityRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_tag_repository::DieselTagRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
pub use unit_of_work::DieselUnitOfWork;
