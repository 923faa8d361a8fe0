//! Wires Diesel repositories and domain services into [`HttpState`].

use std::sync::Arc;

use actix_web::web;

use social_backend::domain::ports::TokenService;
use social_backend::domain::{AccountService, CityService, CommentService, PostService};
use social_backend::inbound::http::state::HttpState;
use social_backend::outbound::persistence::{
    DieselAddressRepository, DieselCityRepository, DieselCommentRepository, DieselPostRepository,
    DieselTagRepository, DieselUnitOfWork, DieselUserRepository,
};
use social_backend::outbound::token::JwtTokenService;

/// Build the shared HTTP state.
///
/// Repositories hold no connection of their own; they resolve the
/// request-scoped context on every call, so one instance serves all workers.
pub(super) fn build_http_state(tokens: Arc<JwtTokenService>) -> web::Data<HttpState> {
    let users = Arc::new(DieselUserRepository::new());
    let cities = Arc::new(DieselCityRepository::new());
    let posts = Arc::new(DieselPostRepository::new());
    let comments = Arc::new(DieselCommentRepository::new());
    let uow = Arc::new(DieselUnitOfWork::new());

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        Arc::new(DieselAddressRepository::new()),
        cities.clone(),
        tokens.clone(),
        uow.clone(),
    ));
    let post_service = Arc::new(PostService::new(
        posts.clone(),
        Arc::new(DieselTagRepository::new()),
        users.clone(),
        comments.clone(),
        uow,
    ));
    let comment_service = Arc::new(CommentService::new(comments, posts, users));

    web::Data::new(HttpState {
        accounts: accounts.clone(),
        accounts_query: accounts,
        cities: Arc::new(CityService::new(cities)),
        posts: post_service.clone(),
        posts_query: post_service,
        comments: comment_service.clone(),
        comments_query: comment_service,
        tokens: tokens as Arc<dyn TokenService>,
    })
}
