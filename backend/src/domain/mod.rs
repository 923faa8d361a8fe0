//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: hold the business rules of the social backend without any
//! knowledge of HTTP, Diesel, or JWT encoding. Inbound adapters call the
//! driving ports; services talk to storage only through driven ports and
//! open transactions through [`ports::UnitOfWork`].
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - Value types: ids, [`Username`], [`Email`], [`Password`], [`TagNames`],
//!   [`Keywords`], [`Pagination`].
//! - Services: [`AccountService`], [`CityService`], [`PostService`],
//!   [`CommentService`], and the [`ReferenceDataSeeder`].

pub mod comment;
pub mod error;
pub mod ids;
pub mod location;
pub mod pagination;
pub mod password;
pub mod ports;
pub mod post;
pub mod trace_id;
pub mod user;

mod account_service;
mod city_service;
mod comment_service;
mod post_service;
mod reference_data;

pub use self::account_service::AccountService;
pub use self::city_service::CityService;
pub use self::comment::{Comment, CommentNode, CommentView, NewComment, build_comment_thread};
pub use self::comment_service::CommentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::ids::{AddressId, CityId, CommentId, InvalidId, PostId, TagId, UserId};
pub use self::location::{Address, AddressInput, City, REFERENCE_CITY_NAMES};
pub use self::pagination::{MAX_PAGE_LIMIT, Page, Pagination, PaginationError};
pub use self::password::{Password, PasswordDigest};
pub use self::post::{Keywords, NewPost, Post, PostSummary, PublishPost, Tag, TagNames};
pub use self::post_service::PostService;
pub use self::reference_data::{AccountSeed, ReferenceDataSeeder, SeedSummary};
pub use self::trace_id::TraceId;
pub use self::user::{
    Email, NewUser, ResolvedAddress, Role, User, UserProfile, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use social_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
