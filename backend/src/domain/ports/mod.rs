//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Command`, `*Query`) are what inbound adapters call.
//! Driven ports (`*Repository`, [`TokenService`], [`UnitOfWork`]) are what
//! services call and outbound adapters implement.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_query;
mod address_repository;
mod city_query;
mod city_repository;
mod comment_command;
mod comment_query;
mod comment_repository;
mod post_command;
mod post_query;
mod post_repository;
mod tag_repository;
mod token_service;
mod unit_of_work;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, LoginRequest, LoginResponse, RegisterRequest};
#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::AccountQuery;
#[cfg(test)]
pub use address_repository::MockAddressRepository;
pub use address_repository::{AddressPersistenceError, AddressRepository};
#[cfg(test)]
pub use city_query::MockCityQuery;
pub use city_query::CityQuery;
#[cfg(test)]
pub use city_repository::MockCityRepository;
pub use city_repository::{CityPersistenceError, CityRepository};
#[cfg(test)]
pub use comment_command::MockCommentCommand;
pub use comment_command::{CommentCommand, CreateComment};
#[cfg(test)]
pub use comment_query::MockCommentQuery;
pub use comment_query::CommentQuery;
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentPersistenceError, CommentRepository};
#[cfg(test)]
pub use post_command::MockPostCommand;
pub use post_command::{LikeOutcome, PostCommand};
#[cfg(test)]
pub use post_query::MockPostQuery;
pub use post_query::PostQuery;
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostPersistenceError, PostRepository};
#[cfg(test)]
pub use tag_repository::MockTagRepository;
pub use tag_repository::{TagPersistenceError, TagRepository};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{AccessToken, TokenError, TokenService};
pub use unit_of_work::{FixtureUnitOfWork, UnitOfWork, UnitOfWorkFuture, in_transaction};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
