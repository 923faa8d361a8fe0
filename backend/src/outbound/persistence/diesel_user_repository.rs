//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! The adapter holds no connection state. Each call resolves the request
//! context, so inserts issued inside a unit of work join its transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, NewUser, User, UserId};

use super::context::DbContext;
use super::diesel_error_mapping::{
    ConstraintViolation, basic_diesel_error_mapper, constraint_violation,
};
use super::models::{NewUserRow, UserRow};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Debug, Default, Clone, Copy)]
pub struct DieselUserRepository;

impl DieselUserRepository {
    /// Create the repository.
    pub fn new() -> Self {
        Self
    }
}

basic_diesel_error_mapper!(UserPersistenceError);

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from(row).map_err(UserPersistenceError::query)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let ctx = DbContext::current()?;
        let row = NewUserRow::from(user);

        let stored: UserRow = ctx
            .with_connection(|conn| {
                async move {
                    diesel::insert_into(users::table)
                        .values(&row)
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(|err| match constraint_violation(&err) {
                            Some(ConstraintViolation::Unique { .. }) => {
                                UserPersistenceError::duplicate_email(row.email.clone())
                            }
                            _ => map_diesel_error(err),
                        })
                }
                .scope_boxed()
            })
            .await?;
        row_to_user(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let ctx = DbContext::current()?;
        let id = *id.as_uuid();
        let row: Option<UserRow> = ctx
            .with_connection(|conn| {
                async move {
                    users::table
                        .filter(users::id.eq(id))
                        .select(UserRow::as_select())
                        .first(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        let ctx = DbContext::current()?;
        let email = email.as_ref().to_owned();
        let row: Option<UserRow> = ctx
            .with_connection(|conn| {
                async move {
                    users::table
                        .filter(users::email.eq(&email))
                        .select(UserRow::as_select())
                        .first(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        row.map(row_to_user).transpose()
    }
}
