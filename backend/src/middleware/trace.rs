//! Request correlation and access logging.
//!
//! Every request runs inside a [`TraceId`] scope. A caller-supplied
//! `trace-id` header is reused when it parses as a UUID, otherwise a fresh
//! identifier is minted. The identifier is echoed on the response and
//! recorded on the request span, and one completion event is logged per
//! request with its status and latency.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, error, info, info_span, warn};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Correlation middleware.
///
/// Handlers and error conversions read the identifier through
/// [`TraceId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use social_backend::middleware::Trace;
///
/// let app = App::new().wrap(Trace);
/// ```
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

/// Reuse the caller's identifier when it is a well-formed UUID.
fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn echo_trace_id<B>(res: &mut ServiceResponse<B>, trace_id: TraceId) {
    match HeaderValue::from_str(&trace_id.to_string()) {
        Ok(value) => {
            res.response_mut()
                .headers_mut()
                .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
        }
        Err(error) => error!(%error, "trace identifier is not a valid header value"),
    }
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
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
        let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
        let span = info_span!(
            "request",
            trace_id = %trace_id,
            method = %req.method(),
            path = %req.path()
        );
        let started = Instant::now();
        let fut = span.in_scope(|| self.service.call(req));

        Box::pin(
            TraceId::scope(trace_id, async move {
                let mut res = fut.await?;
                echo_trace_id(&mut res, trace_id);
                let status = res.status().as_u16();
                let elapsed_ms = started.elapsed().as_millis();
                if res.status().is_server_error() {
                    warn!(status, elapsed_ms, "request failed");
                } else {
                    info!(status, elapsed_ms, "request completed");
                }
                Ok(res)
            })
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use crate::domain::{ApiResult, Error as DomainError};

    async fn call_with_header<F, Fut, Res>(
        handler: F,
        inbound: Option<&'static str>,
    ) -> (ServiceResponse<actix_web::body::BoxBody>, String)
    where
        F: Fn() -> Fut + Clone + 'static,
        Fut: std::future::Future<Output = Res> + 'static,
        Res: actix_web::Responder + 'static,
    {
        let app =
            test::init_service(App::new().wrap(Trace).route("/", web::get().to(handler))).await;
        let mut req = test::TestRequest::get().uri("/");
        if let Some(value) = inbound {
            req = req.insert_header((TRACE_ID_HEADER, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let echoed = res
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("trace id header")
            .to_str()
            .expect("header is ascii")
            .to_owned();
        (res, echoed)
    }

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    #[rstest]
    #[case(None)]
    #[case(Some("not-a-uuid"))]
    #[actix_web::test]
    async fn mints_an_identifier_without_a_usable_header(#[case] inbound: Option<&'static str>) {
        let (_, echoed) = call_with_header(ok, inbound).await;
        assert!(echoed.parse::<TraceId>().is_ok());
        assert_ne!(Some(echoed.as_str()), inbound);
    }

    #[rstest]
    #[actix_web::test]
    async fn reuses_a_caller_supplied_identifier() {
        let supplied = "5f0c8c55-4d1a-4d7e-9a53-0a4cbb3f7e21";
        let (_, echoed) = call_with_header(ok, Some(supplied)).await;
        assert_eq!(echoed, supplied);
    }

    #[rstest]
    #[actix_web::test]
    async fn handlers_see_the_echoed_identifier() {
        let (res, echoed) = call_with_header(
            || async {
                let id = TraceId::current().expect("trace id in scope");
                HttpResponse::Ok().body(id.to_string())
            },
            None,
        )
        .await;
        let body = test::read_body(res).await;
        assert_eq!(std::str::from_utf8(&body).expect("utf8 body"), echoed);
    }

    #[rstest]
    #[actix_web::test]
    async fn error_bodies_carry_the_identifier() {
        let supplied = "0b9f3c1e-95f1-4c55-a0e4-1f0e5f6c2d11";
        let (res, _) = call_with_header(
            || async { ApiResult::<HttpResponse>::Err(DomainError::not_found("post missing")) },
            Some(supplied),
        )
        .await;
        let body: DomainError = test::read_body_json(res).await;
        assert_eq!(body.trace_id(), Some(supplied));
    }
}
