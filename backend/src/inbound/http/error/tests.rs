//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::{App, ResponseError, test as actix_test, web};
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("not the author"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("post not found"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("email is already registered"), StatusCode::CONFLICT)]
#[case(Error::service_unavailable("pool exhausted"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn response_payload(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id is valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted(expected_trace_id: String) {
    let error = Error::internal("connection string leaked")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"secret": "x"}));

    let payload = response_payload(
        error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;

    assert_eq!(payload.code(), ErrorCode::InternalError);
    assert_eq!(payload.message(), "Internal server error");
    assert!(payload.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn conflicts_keep_message_and_details(expected_trace_id: String) {
    let error = Error::conflict("email is already registered")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"field": "email"}));

    let payload =
        response_payload(error, StatusCode::CONFLICT, Some(expected_trace_id.as_str())).await;

    assert_eq!(payload.code(), ErrorCode::Conflict);
    assert_eq!(payload.message(), "email is already registered");
    assert_eq!(payload.details(), Some(&json!({"field": "email"})));
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let error = Error::not_found("post not found");

    let payload = response_payload(error, StatusCode::NOT_FOUND, None).await;
    assert_eq!(payload.trace_id(), None);
}

#[rstest]
#[actix_web::test]
async fn malformed_json_uses_the_error_envelope() {
    async fn echo(body: web::Json<serde_json::Value>) -> web::Json<serde_json::Value> {
        body
    }

    let app = actix_test::init_service(
        App::new()
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/", web::post().to(echo)),
    )
    .await;
    let request = actix_test::TestRequest::post()
        .uri("/")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], json!("invalid_request"));
}

#[given("a service unavailable error code")]
fn a_service_unavailable_error_code() -> ErrorCode {
    ErrorCode::ServiceUnavailable
}

#[when("the adapter maps the code to an HTTP status")]
fn the_adapter_maps_the_code_to_http_status(code: ErrorCode) -> StatusCode {
    super::status_for(code)
}

#[then("the status is 503 Service Unavailable")]
fn the_status_is_503(status: StatusCode) {
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[rstest]
fn unavailable_database_maps_to_503() {
    let code = a_service_unavailable_error_code();
    let status = the_adapter_maps_the_code_to_http_status(code);
    the_status_is_503(status);
}

#[rstest]
fn from_actix_error_is_redacted_internal_error() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
