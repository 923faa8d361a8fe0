//! PostgreSQL-backed `PostRepository` implementation.
//!
//! Listing queries run against `posts ⋈ users` so the author name travels
//! with each row. Tags and like counts for a page are fetched in two batch
//! queries keyed by the page's post identifiers.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::{InnerJoin, IntoBoxed, count_star};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::domain::ports::{PostPersistenceError, PostRepository};
use crate::domain::{
    Keywords, NewPost, Page, Pagination, Post, PostId, PostSummary, Tag, TagId, UserId, Username,
};

use super::context::DbContext;
use super::diesel_error_mapping::{
    ConstraintViolation, basic_diesel_error_mapper, constraint_violation,
};
use super::models::{NewPostLikeRow, NewPostRow, PostRow, PostTagRow, TagRow};
use super::pool::OwnedConnection;
use super::schema::{post_likes, post_tags, posts, tags, users};

type PostsWithAuthors = InnerJoin<posts::table, users::table>;
type BoxedPosts = IntoBoxed<'static, PostsWithAuthors, Pg>;

/// Diesel-backed implementation of the `PostRepository` port.
#[derive(Debug, Default, Clone, Copy)]
pub struct DieselPostRepository;

impl DieselPostRepository {
    /// Create the repository.
    pub fn new() -> Self {
        Self
    }
}

basic_diesel_error_mapper!(PostPersistenceError);

/// Row selection applied to both the page query and its count.
#[derive(Debug, Clone)]
enum PostFilter {
    All,
    Author(Uuid),
    Matching {
        patterns: Vec<String>,
        tagged: Vec<Uuid>,
    },
}

impl PostFilter {
    fn apply(&self) -> BoxedPosts {
        let query = posts::table.inner_join(users::table).into_boxed();
        match self {
            Self::All => query,
            Self::Author(author) => query.filter(posts::author_id.eq(*author)),
            Self::Matching { patterns, tagged } => patterns.iter().fold(
                query.filter(posts::id.eq_any(tagged.clone())),
                |query, pattern| {
                    query
                        .or_filter(users::username.ilike(pattern.clone()))
                        .or_filter(posts::content.ilike(pattern.clone()))
                },
            ),
        }
    }
}

/// Wrap a search term as a substring `ILIKE` pattern with wildcards escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

async fn keyword_filter(
    conn: &mut OwnedConnection,
    keywords: &Keywords,
) -> Result<PostFilter, PostPersistenceError> {
    if keywords.is_empty() {
        return Ok(PostFilter::All);
    }
    let patterns: Vec<String> = keywords.terms().iter().map(|t| like_pattern(t)).collect();
    let tagged_query = patterns.iter().fold(
        post_tags::table
            .inner_join(tags::table)
            .select(post_tags::post_id)
            .distinct()
            .into_boxed(),
        |query, pattern| query.or_filter(tags::name.ilike(pattern.clone())),
    );
    let tagged = tagged_query
        .load::<Uuid>(conn)
        .await
        .map_err(map_diesel_error)?;
    Ok(PostFilter::Matching { patterns, tagged })
}

async fn load_page(
    conn: &mut OwnedConnection,
    filter: PostFilter,
    pagination: Pagination,
) -> Result<Page<PostSummary>, PostPersistenceError> {
    let total: i64 = filter
        .apply()
        .count()
        .get_result(conn)
        .await
        .map_err(map_diesel_error)?;

    let rows: Vec<(PostRow, String)> = filter
        .apply()
        .select((PostRow::as_select(), users::username))
        .order((posts::created_at.desc(), posts::id.desc()))
        .offset(i64::from(pagination.offset()))
        .limit(i64::from(pagination.limit()))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let ids: Vec<Uuid> = rows.iter().map(|(row, _)| row.id).collect();
    let mut tags_by_post = load_tags(conn, &ids).await?;
    let likes_by_post = load_like_counts(conn, &ids).await?;

    let items = rows
        .into_iter()
        .map(|(row, username)| {
            let id = row.id;
            Ok(PostSummary {
                author_username: Username::new(&username)
                    .map_err(|err| PostPersistenceError::query(err.to_string()))?,
                tags: tags_by_post.remove(&id).unwrap_or_default(),
                like_count: likes_by_post.get(&id).copied().unwrap_or_default(),
                post: Post::from(row),
            })
        })
        .collect::<Result<Vec<_>, PostPersistenceError>>()?;

    Ok(Page {
        items,
        total_count: u64::try_from(total).unwrap_or_default(),
        pagination,
    })
}

async fn load_tags(
    conn: &mut OwnedConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Tag>>, PostPersistenceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, TagRow)> = post_tags::table
        .inner_join(tags::table)
        .filter(post_tags::post_id.eq_any(ids.to_vec()))
        .select((post_tags::post_id, TagRow::as_select()))
        .order(tags::name.asc())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    let mut grouped: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for (post_id, row) in rows {
        grouped.entry(post_id).or_default().push(Tag::from(row));
    }
    Ok(grouped)
}

async fn load_like_counts(
    conn: &mut OwnedConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, u64>, PostPersistenceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Uuid, i64)> = post_likes::table
        .filter(post_likes::post_id.eq_any(ids.to_vec()))
        .group_by(post_likes::post_id)
        .select((post_likes::post_id, count_star()))
        .load(conn)
        .await
        .map_err(map_diesel_error)?;

    Ok(rows
        .into_iter()
        .map(|(post_id, count)| (post_id, u64::try_from(count).unwrap_or_default()))
        .collect())
}

const LIKE_POST_FKEY: &str = "post_likes_post_id_fkey";
const LIKE_USER_FKEY: &str = "post_likes_user_id_fkey";

/// Name the missing row behind a foreign key failure on `post_likes`.
fn like_reference_error(
    constraint: Option<&str>,
    row: &NewPostLikeRow,
) -> Option<PostPersistenceError> {
    match constraint? {
        LIKE_POST_FKEY => Some(PostPersistenceError::not_found(row.post_id.to_string())),
        LIKE_USER_FKEY => Some(PostPersistenceError::unknown_user(row.user_id.to_string())),
        _ => None,
    }
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn create(&self, post: &NewPost) -> Result<Post, PostPersistenceError> {
        let ctx = DbContext::current()?;
        let row = NewPostRow::from(post);
        let stored: PostRow = ctx
            .with_connection(|conn| {
                async move {
                    diesel::insert_into(posts::table)
                        .values(&row)
                        .returning(PostRow::as_returning())
                        .get_result(conn)
                        .await
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        Ok(Post::from(stored))
    }

    async fn attach_tags(
        &self,
        post_id: &PostId,
        tag_ids: &[TagId],
    ) -> Result<(), PostPersistenceError> {
        if tag_ids.is_empty() {
            return Ok(());
        }
        let ctx = DbContext::current()?;
        let rows: Vec<PostTagRow> = tag_ids
            .iter()
            .map(|tag_id| PostTagRow {
                post_id: *post_id.as_uuid(),
                tag_id: *tag_id.as_uuid(),
            })
            .collect();
        ctx.with_connection(|conn| {
            async move {
                diesel::insert_into(post_tags::table)
                    .values(&rows)
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .await
                    .map(drop)
                    .map_err(map_diesel_error)
            }
            .scope_boxed()
        })
        .await
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError> {
        let ctx = DbContext::current()?;
        let id = *id.as_uuid();
        let row: Option<PostRow> = ctx
            .with_connection(|conn| {
                async move {
                    posts::table
                        .filter(posts::id.eq(id))
                        .select(PostRow::as_select())
                        .first(conn)
                        .await
                        .optional()
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        Ok(row.map(Post::from))
    }

    async fn list(
        &self,
        keywords: &Keywords,
        pagination: Pagination,
    ) -> Result<Page<PostSummary>, PostPersistenceError> {
        let ctx = DbContext::current()?;
        let keywords = keywords.clone();
        ctx.with_connection(|conn| {
            async move {
                let filter = keyword_filter(conn, &keywords).await?;
                load_page(conn, filter, pagination).await
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_by_author(
        &self,
        author_id: &UserId,
        pagination: Pagination,
    ) -> Result<Page<PostSummary>, PostPersistenceError> {
        let ctx = DbContext::current()?;
        let filter = PostFilter::Author(*author_id.as_uuid());
        ctx.with_connection(|conn| load_page(conn, filter, pagination).scope_boxed())
            .await
    }

    async fn add_like(
        &self,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<bool, PostPersistenceError> {
        let ctx = DbContext::current()?;
        let row = NewPostLikeRow {
            post_id: *post_id.as_uuid(),
            user_id: *user_id.as_uuid(),
        };
        let inserted = ctx
            .with_connection(|conn| {
                async move {
                    diesel::insert_into(post_likes::table)
                        .values(&row)
                        .on_conflict_do_nothing()
                        .execute(conn)
                        .await
                        .map_err(|err| match constraint_violation(&err) {
                            Some(ConstraintViolation::ForeignKey { constraint }) => {
                                like_reference_error(constraint.as_deref(), &row)
                                    .unwrap_or_else(|| map_diesel_error(err))
                            }
                            _ => map_diesel_error(err),
                        })
                }
                .scope_boxed()
            })
            .await?;
        Ok(inserted == 1)
    }

    async fn like_count(&self, post_id: &PostId) -> Result<u64, PostPersistenceError> {
        let ctx = DbContext::current()?;
        let post_id = *post_id.as_uuid();
        let count: i64 = ctx
            .with_connection(|conn| {
                async move {
                    post_likes::table
                        .filter(post_likes::post_id.eq(post_id))
                        .count()
                        .get_result(conn)
                        .await
                        .map_err(map_diesel_error)
                }
                .scope_boxed()
            })
            .await?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostPersistenceError> {
        let ctx = DbContext::current()?;
        let id = *id.as_uuid();
        // Child rows and the post go together even when no unit of work is open.
        ctx.transaction(|| {
            ctx.with_connection(|conn| {
                async move {
                    diesel::delete(post_likes::table.filter(post_likes::post_id.eq(id)))
                        .execute(conn)
                        .await
                        .map_err(map_diesel_error)?;
                    diesel::delete(post_tags::table.filter(post_tags::post_id.eq(id)))
                        .execute(conn)
                        .await
                        .map_err(map_diesel_error)?;
                    let removed = diesel::delete(posts::table.filter(posts::id.eq(id)))
                        .execute(conn)
                        .await
                        .map_err(map_diesel_error)?;
                    Ok(removed > 0)
                }
                .scope_boxed()
            })
        })
        .await
    }
}
