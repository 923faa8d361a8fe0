//! PostgreSQL-backed `CityRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::domain::ports::{CityPersistenceError, CityRepository};
use crate::domain::{City, CityId};

use super::context::DbContext;
use super::diesel_error_mapping::basic_diesel_error_mapper;
use super::models::{CityRow, NewCityRow};
use super::schema::cities;

/// Diesel-backed implementation of the `CityRepository` port.
#[derive(Debug, Default, Clone, Copy)]
pub struct DieselCityRepository;

impl DieselCityRepository {
    /// Create the repository.
    pub fn new() -> Self {
        Self
    }
}

basic_diesel_error_mapper!(CityPersistenceError);

#[async_trait]
impl CityRepository for DieselCityRepository {
    async fn list_all(&self) -> Result<Vec<City>, CityPersistenceError> {
        let ctx = DbContext::current()?;
        let rows: Vec<CityRow> = ctx
            .with_connection(|conn| {
                async move {
                    cities::table
                        .select(CityRow::as_select())
                        .order(cities::name.asc())
                        .load(conn)
                        .await
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        Ok(rows.into_iter().map(City::from).collect())
    }

    async fn find_by_id(&self, id: &CityId) -> Result<Option<City>, CityPersistenceError> {
        let ctx = DbContext::current()?;
        let id = *id.as_uuid();
        let row: Option<CityRow> = ctx
            .with_connection(|conn| {
                async move {
                    cities::table
                        .filter(cities::id.eq(id))
                        .select(CityRow::as_select())
                        .first(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        Ok(row.map(City::from))
    }

    async fn insert_missing(&self, names: &[String]) -> Result<usize, CityPersistenceError> {
        if names.is_empty() {
            return Ok(0);
        }
        let ctx = DbContext::current()?;
        let rows: Vec<NewCityRow> = names
            .iter()
            .map(|name| NewCityRow {
                id: Uuid::new_v4(),
                name: name.clone(),
            })
            .collect();
        ctx.with_connection(|conn| {
            async move {
                diesel::insert_into(cities::table)
                    .values(&rows)
                    .on_conflict(cities::name)
                    .do_nothing()
                    .execute(conn)
                    .await
                    .map_err(map_diesel_error)
            }
            .scope_boxed()
        })
        .await
    }
}
