//! City reference data queries.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{CityQuery, CityRepository};
use crate::domain::{City, CityId, Error};

/// Read-only service over the city table.
#[derive(Clone)]
pub struct CityService<C> {
    cities: Arc<C>,
}

impl<C> CityService<C> {
    /// Create a service over the city repository.
    pub fn new(cities: Arc<C>) -> Self {
        Self { cities }
    }
}

#[async_trait]
impl<C: CityRepository> CityQuery for CityService<C> {
    async fn list_cities(&self) -> Result<Vec<City>, Error> {
        Ok(self.cities.list_all().await?)
    }

    async fn get_city(&self, id: &CityId) -> Result<City, Error> {
        self.cities
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("city {id} does not exist")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{CityPersistenceError, MockCityRepository};
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn missing_city_is_not_found() {
        let mut repo = MockCityRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));
        let service = CityService::new(Arc::new(repo));

        let err = service
            .get_city(&CityId::random())
            .await
            .expect_err("missing city");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_surface_as_service_unavailable() {
        let mut repo = MockCityRepository::new();
        repo.expect_list_all()
            .return_once(|| Err(CityPersistenceError::connection("pool exhausted")));
        let service = CityService::new(Arc::new(repo));

        let err = service.list_cities().await.expect_err("pool failure");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }
}
