//! HTTP inbound adapter exposing the REST endpoints under `/api`.

pub mod auth;
pub mod cities;
pub mod comments;
pub mod error;
pub mod health;
pub mod posts;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
