//! PostgreSQL-backed `TagRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::domain::Tag;
use crate::domain::ports::{TagPersistenceError, TagRepository};

use super::context::DbContext;
use super::diesel_error_mapping::basic_diesel_error_mapper;
use super::models::TagRow;
use super::schema::tags;

/// Diesel-backed implementation of the `TagRepository` port.
#[derive(Debug, Default, Clone, Copy)]
pub struct DieselTagRepository;

impl DieselTagRepository {
    /// Create the repository.
    pub fn new() -> Self {
        Self
    }
}

basic_diesel_error_mapper!(TagPersistenceError);

#[async_trait]
impl TagRepository for DieselTagRepository {
    async fn find_by_names(&self, names: &[String]) -> Result<Vec<Tag>, TagPersistenceError> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let ctx = DbContext::current()?;
        let names = names.to_vec();
        let rows: Vec<TagRow> = ctx
            .with_connection(|conn| {
                async move {
                    tags::table
                        .filter(tags::name.eq_any(names))
                        .select(TagRow::as_select())
                        .load(conn)
                        .await
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn create_all(&self, new_tags: &[Tag]) -> Result<(), TagPersistenceError> {
        if new_tags.is_empty() {
            return Ok(());
        }
        let ctx = DbContext::current()?;
        let rows: Vec<TagRow> = new_tags.iter().map(TagRow::from).collect();
        ctx.with_connection(|conn| {
            async move {
                diesel::insert_into(tags::table)
                    .values(&rows)
                    .on_conflict(tags::name)
                    .do_nothing()
                    .execute(conn)
                    .await
                    .map(drop)
                    .map_err(map_diesel_error)
            }
            .scope_boxed()
        })
        .await
    }
}
