//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::UserId;
use crate::domain::ports::{
    MockAccountCommand, MockAccountQuery, MockCityQuery, MockCommentCommand, MockCommentQuery,
    MockPostCommand, MockPostQuery, MockTokenService, TokenError,
};
use crate::inbound::http::state::HttpState;

/// Bearer token accepted by [`tokens_for`].
pub const TEST_TOKEN: &str = "test-token";

/// Mocked ports; unset mocks panic when a handler reaches them.
#[derive(Default)]
pub struct TestPorts {
    pub accounts: MockAccountCommand,
    pub accounts_query: MockAccountQuery,
    pub cities: MockCityQuery,
    pub posts: MockPostCommand,
    pub posts_query: MockPostQuery,
    pub comments: MockCommentCommand,
    pub comments_query: MockCommentQuery,
    pub tokens: MockTokenService,
}

impl TestPorts {
    /// Ports whose token service accepts [`TEST_TOKEN`] for `user_id`.
    pub fn authenticated_as(user_id: UserId) -> Self {
        Self {
            tokens: tokens_for(user_id),
            ..Self::default()
        }
    }

    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState {
            accounts: Arc::new(self.accounts),
            accounts_query: Arc::new(self.accounts_query),
            cities: Arc::new(self.cities),
            posts: Arc::new(self.posts),
            posts_query: Arc::new(self.posts_query),
            comments: Arc::new(self.comments),
            comments_query: Arc::new(self.comments_query),
            tokens: Arc::new(self.tokens),
        })
    }
}

/// Token service accepting [`TEST_TOKEN`] and rejecting anything else.
pub fn tokens_for(user_id: UserId) -> MockTokenService {
    let mut tokens = MockTokenService::new();
    tokens
        .expect_verify()
        .returning(move |token| match token {
            TEST_TOKEN => Ok(user_id),
            _ => Err(TokenError::invalid("unknown test token")),
        });
    tokens
}

/// `Authorization` header carrying [`TEST_TOKEN`].
pub fn bearer() -> (&'static str, String) {
    ("Authorization", format!("Bearer {TEST_TOKEN}"))
}
