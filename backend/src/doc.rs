//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `/api`, the health probes, and
//! the schema wrappers from [`crate::inbound::http::schemas`]. Swagger UI
//! serves it in debug builds; `cargo run --bin openapi-dump` prints it.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::comments::{CommentResponse, CreateCommentRequest};
use crate::inbound::http::cities::CityResponse;
use crate::inbound::http::posts::{
    CreatePostRequest, DeletedPostResponse, LikeResponse, PostPageResponse, PostResponse,
    TagResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{
    AddressRequest, AddressResponse, LoginRequestBody, LoginResponseBody, RegisterRequestBody,
    UserProfileResponse,
};

/// Adds the bearer JWT security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /api/user/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Social backend API",
        description = "Accounts, posts, likes, tags and threaded comments over JSON.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::cities::list_cities,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::list_posts,
        crate::inbound::http::posts::posts_by_author,
        crate::inbound::http::posts::like_post,
        crate::inbound::http::posts::delete_post,
        crate::inbound::http::comments::create_comment,
        crate::inbound::http::comments::comment_thread,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequestBody,
        AddressRequest,
        LoginRequestBody,
        LoginResponseBody,
        UserProfileResponse,
        AddressResponse,
        CityResponse,
        CreatePostRequest,
        PostResponse,
        TagResponse,
        PostPageResponse,
        LikeResponse,
        DeletedPostResponse,
        CreateCommentRequest,
        CommentResponse,
    )),
    tags(
        (name = "users", description = "Registration, login and profile"),
        (name = "cities", description = "City reference data"),
        (name = "posts", description = "Posts, tags and likes"),
        (name = "comments", description = "Threaded comments"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
