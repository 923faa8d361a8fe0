//! Driving port for the city list.

use async_trait::async_trait;

use crate::domain::{City, CityId, Error};

/// Driving port for city reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CityQuery: Send + Sync {
    /// Every known city.
    async fn list_cities(&self) -> Result<Vec<City>, Error>;

    /// One city, or `not_found`.
    async fn get_city(&self, id: &CityId) -> Result<City, Error>;
}
