//! Bearer authentication for HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! token extraction and user identity derivation here.

use actix_web::http::header::{AUTHORIZATION, HeaderValue};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::{debug, error};

use crate::domain::ports::TokenService;
use crate::domain::{Error, UserId};
use crate::inbound::http::state::HttpState;

use super::ApiResult;

pub(crate) const MISSING_AUTHORIZATION: &str = "authorization header is required";
pub(crate) const INVALID_TOKEN: &str = "invalid token";

/// Resolve the caller from an `Authorization: Bearer <token>` header value.
pub fn authenticate(tokens: &dyn TokenService, header: Option<&HeaderValue>) -> ApiResult<UserId> {
    let header = header.ok_or_else(|| Error::unauthorized(MISSING_AUTHORIZATION))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized(INVALID_TOKEN))?;
    let token = match value.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => {
            debug!("authorization header without bearer scheme");
            return Err(Error::unauthorized(INVALID_TOKEN));
        }
    };
    if token.is_empty() {
        return Err(Error::unauthorized(INVALID_TOKEN));
    }
    Ok(tokens.verify(token)?)
}

/// Authenticated caller extracted from the bearer token.
///
/// # Examples
/// ```
/// use social_backend::inbound::http::auth::BearerUser;
///
/// async fn handler(user: BearerUser) -> String {
///     user.user_id().to_string()
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BearerUser(UserId);

impl BearerUser {
    /// Identifier carried by the verified token.
    pub fn user_id(&self) -> &UserId {
        &self.0
    }

    fn extract(req: &HttpRequest) -> Result<Self, Error> {
        let state = req.app_data::<web::Data<HttpState>>().ok_or_else(|| {
            error!("HttpState missing from application data");
            Error::internal("http state is not configured")
        })?;
        authenticate(state.tokens.as_ref(), req.headers().get(AUTHORIZATION)).map(Self)
    }
}

impl FromRequest for BearerUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::extract(req))
    }
}
