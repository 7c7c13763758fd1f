//! Tests for domain error construction and trace propagation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
#[case::invalid(Error::invalid_request("x"), ErrorCode::InvalidRequest)]
#[case::unauthorized(Error::unauthorized("x"), ErrorCode::Unauthorized)]
#[case::forbidden(Error::forbidden("x"), ErrorCode::Forbidden)]
#[case::not_found(Error::not_found("x"), ErrorCode::NotFound)]
#[case::conflict(Error::conflict("x"), ErrorCode::Conflict)]
#[case::unavailable(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
#[case::internal(Error::internal("x"), ErrorCode::InternalError)]
fn constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_trace_id_rejects_empty_values(base_error: Error) {
    let result = base_error.try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn new_returns_none_when_trace_id_out_of_scope() {
    let error = Error::internal("boom");
    assert!(error.trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("fixture is a valid UUID");
    let error = TraceId::scope(trace_id, async move { Error::internal("boom") }).await;

    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_camel_case_and_skips_absent_fields(base_error: Error) {
    let value = serde_json::to_value(base_error.with_trace_id(TRACE_ID)).expect("serialise");
    assert_eq!(value.get("code"), Some(&json!("invalid_request")));
    assert_eq!(value.get("traceId"), Some(&json!(TRACE_ID)));
    assert!(value.get("details").is_none());
}

#[rstest]
fn details_round_trip(base_error: Error) {
    let error = base_error.with_details(json!({ "field": "email" }));
    assert_eq!(
        error.details().and_then(|details| details.get("field")),
        Some(&json!("email"))
    );
}
