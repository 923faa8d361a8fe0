//! Post HTTP handlers.
//!
//! ```text
//! POST /api/post {"content":"hello","tags":["rust"]}
//! GET /api/post/list/offset/0/limit/20?keywords=rust,async
//! GET /api/post/author/{authorId}/offset/0/limit/20
//! POST /api/post/{postId}/like
//! DELETE /api/post/{postId}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::LikeOutcome;
use crate::domain::{Keywords, Page, PostId, PostSummary, PublishPost, Tag, TagNames, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id, parse_pagination, require_text};

/// Payload for `POST /api/post`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub content: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Tag attached to a post.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    pub id: String,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(value: Tag) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
        }
    }
}

/// Post with its author, tags and like count.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub author_username: String,
    pub content: String,
    pub image_url: Option<String>,
    pub tags: Vec<TagResponse>,
    pub like_count: u64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PostSummary> for PostResponse {
    fn from(value: PostSummary) -> Self {
        let PostSummary {
            post,
            author_username,
            tags,
            like_count,
        } = value;
        Self {
            id: post.id.to_string(),
            author_id: post.author_id.to_string(),
            author_username: author_username.to_string(),
            content: post.content,
            image_url: post.image_url,
            tags: tags.into_iter().map(TagResponse::from).collect(),
            like_count,
            created_at: post.created_at.to_rfc3339(),
            updated_at: post.updated_at.to_rfc3339(),
        }
    }
}

/// One page of posts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostPageResponse {
    pub data: Vec<PostResponse>,
    pub total_count: u64,
    pub offset: u32,
    pub limit: u32,
}

impl From<Page<PostSummary>> for PostPageResponse {
    fn from(value: Page<PostSummary>) -> Self {
        let offset = value.pagination.offset();
        let limit = value.pagination.limit();
        let page = value.map(PostResponse::from);
        Self {
            data: page.items,
            total_count: page.total_count,
            offset,
            limit,
        }
    }
}

/// Result of liking a post.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    /// `false` when the caller had already liked the post.
    pub liked: bool,
    pub like_count: u64,
}

impl From<LikeOutcome> for LikeResponse {
    fn from(value: LikeOutcome) -> Self {
        Self {
            liked: value.newly_liked,
            like_count: value.like_count,
        }
    }
}

/// Confirmation returned after a delete.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPostResponse {
    pub id: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct PageParams {
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Path)]
pub struct AuthorPageParams {
    pub author_id: String,
    pub offset: u32,
    pub limit: u32,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct KeywordsQuery {
    /// Comma separated search terms.
    pub keywords: Option<String>,
}

fn parse_post_id(raw: &str) -> ApiResult<PostId> {
    parse_id(raw, FieldName::new("postId"), PostId::parse)
}

/// Publish a post, creating any tags that do not exist yet.
#[utoipa::path(
    post,
    path = "/api/post",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/post")]
pub async fn create_post(
    state: web::Data<HttpState>,
    caller: BearerUser,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let request = PublishPost {
        author_id: *caller.user_id(),
        content: require_text(body.content, FieldName::new("content"))?,
        image_url: body.image_url.filter(|url| !url.trim().is_empty()),
        tags: TagNames::from_raw(body.tags),
    };
    let summary = state.posts.create_post(request).await?;
    Ok(HttpResponse::Created().json(PostResponse::from(summary)))
}

/// Newest posts first, optionally filtered by keywords.
#[utoipa::path(
    get,
    path = "/api/post/list/offset/{offset}/limit/{limit}",
    params(PageParams, KeywordsQuery),
    responses(
        (status = 200, description = "Posts", body = PostPageResponse),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "listPosts",
    security([])
)]
#[get("/post/list/offset/{offset}/limit/{limit}")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    path: web::Path<PageParams>,
    query: web::Query<KeywordsQuery>,
) -> ApiResult<web::Json<PostPageResponse>> {
    let PageParams { offset, limit } = path.into_inner();
    let pagination = parse_pagination(offset, limit)?;
    let keywords = query
        .into_inner()
        .keywords
        .as_deref()
        .map(Keywords::parse)
        .unwrap_or_default();
    let page = state.posts_query.list_posts(keywords, pagination).await?;
    Ok(web::Json(PostPageResponse::from(page)))
}

/// Newest posts of one author first.
#[utoipa::path(
    get,
    path = "/api/post/author/{authorId}/offset/{offset}/limit/{limit}",
    params(AuthorPageParams),
    responses(
        (status = 200, description = "Posts", body = PostPageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Unknown author", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "postsByAuthor",
    security([])
)]
#[get("/post/author/{authorId}/offset/{offset}/limit/{limit}")]
pub async fn posts_by_author(
    state: web::Data<HttpState>,
    path: web::Path<AuthorPageParams>,
) -> ApiResult<web::Json<PostPageResponse>> {
    let params = path.into_inner();
    let author_id = parse_id(&params.author_id, FieldName::new("authorId"), UserId::parse)?;
    let pagination = parse_pagination(params.offset, params.limit)?;
    let page = state
        .posts_query
        .posts_by_author(&author_id, pagination)
        .await?;
    Ok(web::Json(PostPageResponse::from(page)))
}

/// Like a post. Liking twice keeps a single like.
#[utoipa::path(
    post,
    path = "/api/post/{postId}/like",
    params(("postId" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Like recorded", body = LikeResponse),
        (status = 400, description = "Invalid post id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown post", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "likePost"
)]
#[post("/post/{postId}/like")]
pub async fn like_post(
    state: web::Data<HttpState>,
    caller: BearerUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<LikeResponse>> {
    let post_id = parse_post_id(&path.into_inner())?;
    let outcome = state.posts.like_post(&post_id, caller.user_id()).await?;
    Ok(web::Json(LikeResponse::from(outcome)))
}

/// Delete one of the caller's posts with its comments, likes and tag links.
#[utoipa::path(
    delete,
    path = "/api/post/{postId}",
    params(("postId" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Post deleted", body = DeletedPostResponse),
        (status = 400, description = "Invalid post id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not the author", body = ErrorSchema),
        (status = 404, description = "Unknown post", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/post/{postId}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    caller: BearerUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<DeletedPostResponse>> {
    let post_id = parse_post_id(&path.into_inner())?;
    state.posts.delete_post(&post_id, caller.user_id()).await?;
    Ok(web::Json(DeletedPostResponse {
        id: post_id.to_string(),
    }))
}
