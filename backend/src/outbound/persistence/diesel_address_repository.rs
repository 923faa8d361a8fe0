//! PostgreSQL-backed `AddressRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::domain::ports::{AddressPersistenceError, AddressRepository};
use crate::domain::{Address, AddressId};

use super::context::DbContext;
use super::diesel_error_mapping::{
    ConstraintViolation, basic_diesel_error_mapper, constraint_violation,
};
use super::models::AddressRow;
use super::schema::addresses;

/// Diesel-backed implementation of the `AddressRepository` port.
#[derive(Debug, Default, Clone, Copy)]
pub struct DieselAddressRepository;

impl DieselAddressRepository {
    /// Create the repository.
    pub fn new() -> Self {
        Self
    }
}

basic_diesel_error_mapper!(AddressPersistenceError);

#[async_trait]
impl AddressRepository for DieselAddressRepository {
    async fn create(&self, address: &Address) -> Result<(), AddressPersistenceError> {
        let ctx = DbContext::current()?;
        let row = AddressRow::from(address);
        ctx.with_connection(|conn| {
            async move {
                diesel::insert_into(addresses::table)
                    .values(&row)
                    .execute(conn)
                    .await
                    .map(drop)
                    .map_err(|err| match constraint_violation(&err) {
                        Some(ConstraintViolation::ForeignKey { .. }) => {
                            AddressPersistenceError::unknown_city(row.city_id.to_string())
                        }
                        _ => map_diesel_error(err),
                    })
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: &AddressId,
    ) -> Result<Option<Address>, AddressPersistenceError> {
        let ctx = DbContext::current()?;
        let id = *id.as_uuid();
        let row: Option<AddressRow> = ctx
            .with_connection(|conn| {
                async move {
                    addresses::table
                        .filter(addresses::id.eq(id))
                        .select(AddressRow::as_select())
                        .first(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        Ok(row.map(Address::from))
    }
}
