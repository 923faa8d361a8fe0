//! Port abstraction for the city reference table.
use async_trait::async_trait;

use crate::domain::{City, CityId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by city repository adapters.
    pub enum CityPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => ServiceUnavailable: "city repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => InternalError: "city repository query failed: {message}",
    }
}

/// Driven port for cities.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CityRepository: Send + Sync {
    /// All cities ordered by name.
    async fn list_all(&self) -> Result<Vec<City>, CityPersistenceError>;

    /// Fetch a city by identifier.
    async fn find_by_id(&self, id: &CityId) -> Result<Option<City>, CityPersistenceError>;

    /// Insert the named cities that do not exist yet. Returns how many rows
    /// were added.
    async fn insert_missing(&self, names: &[String]) -> Result<usize, CityPersistenceError>;
}
