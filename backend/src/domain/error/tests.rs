//! Tests for the domain error payload and its structured details.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn invalid_request_constructor_sets_code() {
    let err = Error::invalid_request("bad");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn insufficient_stock_carries_available_and_requested() {
    let err = Error::insufficient_stock(ProductId::new(7), 3, 5);

    assert_eq!(err.code(), ErrorCode::InsufficientStock);
    assert_eq!(
        err.details(),
        Some(&json!({ "productId": 7, "available": 3, "requested": 5 }))
    );
    assert!(err.message().contains("3 available"));
}

#[rstest]
fn single_missing_product_uses_singular_message() {
    let err = Error::product_not_found(ProductId::new(12));

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(err.message(), "product not found: 12");
    assert_eq!(err.details(), Some(&json!({ "missingProductIds": [12] })));
}

#[rstest]
fn invalid_transition_names_both_states() {
    let err = Error::invalid_transition(OrderStatus::Pending, OrderStatus::Shipped);

    assert_eq!(err.code(), ErrorCode::InvalidTransition);
    assert_eq!(err.details(), Some(&json!({ "from": "pending", "to": "shipped" })));
}

#[rstest]
fn serde_round_trip_preserves_details() {
    let err = Error::insufficient_stock(ProductId::new(1), 0, 2);
    let encoded = serde_json::to_value(&err).expect("serialise error");

    assert_eq!(encoded["code"], json!("insufficient_stock"));
    let decoded: Error = serde_json::from_value(encoded).expect("deserialise error");
    assert_eq!(decoded, err);
}

#[rstest]
fn deserialising_blank_message_fails() {
    let payload = json!({ "code": "not_found", "message": "  " });
    let result = serde_json::from_value::<Error>(payload);
    assert!(result.is_err());
}
