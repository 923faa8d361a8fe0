//! Middleware installing a fresh database context for every request.
//!
//! The context starts on the ambient handle. Repositories and units of work
//! reach it through [`DbContext::current`]; it is dropped with the request,
//! so no handle or pinned connection outlives the response.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::outbound::persistence::{DbContext, DbPool};

/// Wraps each request in its own [`DbContext`] scope.
///
/// # Examples
/// ```no_run
/// use actix_web::App;
/// use social_backend::middleware::RequestContext;
/// use social_backend::outbound::persistence::{DbPool, PoolConfig};
///
/// let pool = DbPool::lazy(PoolConfig::new("postgres://localhost/social"));
/// let _app = App::new().wrap(RequestContext::new(pool));
/// ```
#[derive(Clone)]
pub struct RequestContext {
    pool: DbPool,
}

impl RequestContext {
    /// Middleware drawing connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestContext
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestContextMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestContextMiddleware {
            service,
            pool: self.pool.clone(),
        }))
    }
}

/// Service wrapper produced by [`RequestContext`].
pub struct RequestContextMiddleware<S> {
    service: S,
    pool: DbPool,
}

impl<S, B> Service<ServiceRequest> for RequestContextMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let ctx = Arc::new(DbContext::new(self.pool.clone()));
        debug!(path = %req.path(), "request context installed");
        let fut = self.service.call(req);
        Box::pin(ctx.scope(fut))
    }
}
