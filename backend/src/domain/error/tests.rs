//! Tests for the domain error payload and its serde contract.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn detailed_error() -> DomainError {
    DomainError::invalid_argument("bad contact").with_details(json!({"field": "contact"}))
}

#[rstest]
#[case(DomainError::invalid_argument("bad"), ErrorCode::InvalidArgument)]
#[case(DomainError::not_found("missing"), ErrorCode::NotFound)]
#[case(DomainError::already_exists("dup"), ErrorCode::AlreadyExists)]
#[case(DomainError::internal("boom"), ErrorCode::Internal)]
#[case(DomainError::cancelled("late"), ErrorCode::Cancelled)]
fn constructors_set_code(#[case] error: DomainError, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = DomainError::try_new(ErrorCode::InvalidArgument, "   ");
    assert!(matches!(result, Err(DomainErrorValidationError::EmptyMessage)));
}

#[rstest]
fn display_uses_message() {
    assert_eq!(DomainError::not_found("contact missing").to_string(), "contact missing");
}

#[rstest]
fn serialises_with_snake_case_code(detailed_error: DomainError) {
    let value = serde_json::to_value(&detailed_error).expect("error serialises");
    assert_eq!(
        value,
        json!({
            "code": "invalid_argument",
            "message": "bad contact",
            "details": {"field": "contact"}
        })
    );
}

#[rstest]
fn round_trips_through_json(detailed_error: DomainError) {
    let text = serde_json::to_string(&detailed_error).expect("error serialises");
    let decoded: DomainError = serde_json::from_str(&text).expect("error deserialises");
    assert_eq!(decoded, detailed_error);
}

#[rstest]
fn deserialising_blank_message_fails() {
    let result: Result<DomainError, _> =
        serde_json::from_value(json!({"code": "not_found", "message": " "}));
    assert!(result.is_err());
}
