//! PostgreSQL-backed `CommentRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;

use crate::domain::ports::{CommentPersistenceError, CommentRepository};
use crate::domain::{Comment, CommentId, CommentView, NewComment, PostId, Username};

use super::context::DbContext;
use super::diesel_error_mapping::basic_diesel_error_mapper;
use super::models::{CommentRow, NewCommentRow};
use super::schema::{comments, users};

/// Diesel-backed implementation of the `CommentRepository` port.
#[derive(Debug, Default, Clone, Copy)]
pub struct DieselCommentRepository;

impl DieselCommentRepository {
    /// Create the repository.
    pub fn new() -> Self {
        Self
    }
}

basic_diesel_error_mapper!(CommentPersistenceError);

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn create(&self, comment: &NewComment) -> Result<Comment, CommentPersistenceError> {
        let ctx = DbContext::current()?;
        let row = NewCommentRow::from(comment);
        let stored: CommentRow = ctx
            .with_connection(|conn| {
                async move {
                    diesel::insert_into(comments::table)
                        .values(&row)
                        .returning(CommentRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        Ok(Comment::from(stored))
    }

    async fn find_by_id(
        &self,
        id: &CommentId,
    ) -> Result<Option<Comment>, CommentPersistenceError> {
        let ctx = DbContext::current()?;
        let id = *id.as_uuid();
        let row: Option<CommentRow> = ctx
            .with_connection(|conn| {
                async move {
                    comments::table
                        .filter(comments::id.eq(id))
                        .select(CommentRow::as_select())
                        .first(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        Ok(row.map(Comment::from))
    }

    async fn list_for_post(
        &self,
        post_id: &PostId,
    ) -> Result<Vec<CommentView>, CommentPersistenceError> {
        let ctx = DbContext::current()?;
        let post_id = *post_id.as_uuid();
        let rows: Vec<(CommentRow, String)> = ctx
            .with_connection(|conn| {
                async move {
                    comments::table
                        .inner_join(users::table)
                        .filter(comments::post_id.eq(post_id))
                        .select((CommentRow::as_select(), users::username))
                        .order((comments::created_at.asc(), comments::id.asc()))
                        .load(conn)
                        .await
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;

        rows.into_iter()
            .map(|(row, username)| {
                Ok(CommentView {
                    username: Username::new(&username)
                        .map_err(|err| CommentPersistenceError::query(err.to_string()))?,
                    comment: Comment::from(row),
                })
            })
            .collect()
    }

    async fn delete_for_post(&self, post_id: &PostId) -> Result<usize, CommentPersistenceError> {
        let ctx = DbContext::current()?;
        let post_id = *post_id.as_uuid();
        // Replies reference their parents; a single statement removes the
        // whole thread before foreign keys are checked.
        ctx.with_connection(|conn| {
            async move {
                diesel::delete(comments::table.filter(comments::post_id.eq(post_id)))
                    .execute(conn)
                    .await
                    .map_err(map_diesel_error)
            }
            .scope_boxed()
        })
        .await
    }
}
