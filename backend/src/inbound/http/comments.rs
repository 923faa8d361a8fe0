//! Comment HTTP handlers.
//!
//! ```text
//! POST /api/comment {"postId":"…","content":"nice","parentId":null}
//! GET /api/comment/list/post/{postId}
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::CreateComment;
use crate::domain::{CommentId, CommentNode, CommentView, PostId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_id, require_text};

/// Payload for `POST /api/comment`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: Option<String>,
    pub content: Option<String>,
    /// Comment being replied to; omit for a root comment.
    pub parent_id: Option<String>,
}

/// Comment with its author and nested replies.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub user_id: String,
    pub username: String,
    pub parent_id: Option<String>,
    pub content: String,
    pub created_at: String,
    #[schema(no_recursion)]
    pub replies: Vec<CommentResponse>,
}

impl From<CommentView> for CommentResponse {
    fn from(value: CommentView) -> Self {
        let CommentView { comment, username } = value;
        Self {
            id: comment.id.to_string(),
            post_id: comment.post_id.to_string(),
            user_id: comment.user_id.to_string(),
            username: username.to_string(),
            parent_id: comment.parent_id.map(|id| id.to_string()),
            content: comment.content,
            created_at: comment.created_at.to_rfc3339(),
            replies: Vec::new(),
        }
    }
}

impl From<CommentNode> for CommentResponse {
    fn from(value: CommentNode) -> Self {
        let mut response = Self::from(value.comment);
        response.replies = value.replies.into_iter().map(Self::from).collect();
        response
    }
}

fn parse_create_comment(body: CreateCommentRequest, caller: &BearerUser) -> ApiResult<CreateComment> {
    let post_field = FieldName::new("postId");
    let raw_post = body.post_id.ok_or_else(|| missing_field_error(post_field))?;
    let parent_id = body
        .parent_id
        .as_deref()
        .map(|raw| parse_id(raw, FieldName::new("parentId"), CommentId::parse))
        .transpose()?;
    Ok(CreateComment {
        post_id: parse_id(&raw_post, post_field, PostId::parse)?,
        user_id: *caller.user_id(),
        content: require_text(body.content, FieldName::new("content"))?,
        parent_id,
    })
}

/// Comment on a post or reply to an existing comment.
#[utoipa::path(
    post,
    path = "/api/comment",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown post or parent comment", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "createComment"
)]
#[post("/comment")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    caller: BearerUser,
    payload: web::Json<CreateCommentRequest>,
) -> ApiResult<HttpResponse> {
    let request = parse_create_comment(payload.into_inner(), &caller)?;
    let view = state.comments.create_comment(request).await?;
    Ok(HttpResponse::Created().json(CommentResponse::from(view)))
}

/// Root comments of a post, oldest first, with their replies nested.
#[utoipa::path(
    get,
    path = "/api/comment/list/post/{postId}",
    params(("postId" = String, Path, description = "Post identifier")),
    responses(
        (status = 200, description = "Comment thread", body = [CommentResponse]),
        (status = 400, description = "Invalid post id", body = ErrorSchema),
        (status = 404, description = "Unknown post", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "commentThread",
    security([])
)]
#[get("/comment/list/post/{postId}")]
pub async fn comment_thread(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CommentResponse>>> {
    let post_id = parse_id(&path.into_inner(), FieldName::new("postId"), PostId::parse)?;
    let thread = state.comments_query.comment_thread(&post_id).await?;
    Ok(web::Json(thread.into_iter().map(CommentResponse::from).collect()))
}
