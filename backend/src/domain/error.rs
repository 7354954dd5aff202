//! Domain-level error types.
//!
//! These errors are transport agnostic. The surrounding HTTP layer maps them
//! to status codes; the codes and `details` payloads are stable so callers can
//! render actionable messages (for example, how many units remain in stock).

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{OrderStatus, ProductId};

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// A referenced product, order, or cart line does not exist.
    NotFound,
    /// A requested quantity exceeds the authoritative stock level.
    InsufficientStock,
    /// The order status transition is not permitted.
    InvalidTransition,
    /// Neither a user nor a session identity accompanied a cart operation.
    MissingIdentity,
    /// A backing store (cache or database) is unavailable.
    ServiceUnavailable,
    /// An unexpected error occurred inside the domain.
    InternalError,
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` must be non-empty once trimmed of whitespace.
///
/// # Examples
/// ```
/// use storefront::domain::{Error, ErrorCode};
///
/// let err = Error::new(ErrorCode::NotFound, "missing");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
#[serde(try_from = "ErrorDto", into = "ErrorDto")]
pub struct Error {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
}

/// Validation errors emitted by the constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorValidationError {
    EmptyMessage,
}

impl std::fmt::Display for ErrorValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "error message must not be empty"),
        }
    }
}

impl std::error::Error for ErrorValidationError {}

impl Error {
    /// Create a new error, panicking if validation fails.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        match Self::try_new(code, message) {
            Ok(value) => value,
            Err(err) => panic!("error messages must satisfy validation: {err}"),
        }
    }

    /// Fallible constructor that validates the message content.
    pub fn try_new(code: ErrorCode, message: impl Into<String>) -> Result<Self, ErrorValidationError> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ErrorValidationError::EmptyMessage);
        }
        Ok(Self {
            code,
            message,
            details: None,
        })
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details for adapters.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Attach structured details to the error.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::Error;
    /// use serde_json::json;
    ///
    /// let err = Error::invalid_request("bad").with_details(json!({ "field": "quantity" }));
    /// assert!(err.details().is_some());
    /// ```
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::MissingIdentity`].
    pub fn missing_identity() -> Self {
        Self::new(
            ErrorCode::MissingIdentity,
            "cart operations require a user or session identity",
        )
    }

    /// Convenience constructor for [`ErrorCode::ServiceUnavailable`].
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// A single product id that the catalogue does not know about.
    pub fn product_not_found(product_id: ProductId) -> Self {
        Self::products_not_found(&[product_id])
    }

    /// One or more product ids missing from the catalogue, listed in full.
    ///
    /// # Examples
    /// ```
    /// use storefront::domain::{Error, ErrorCode, ProductId};
    ///
    /// let err = Error::products_not_found(&[ProductId::new(4), ProductId::new(9)]);
    /// assert_eq!(err.code(), ErrorCode::NotFound);
    /// assert_eq!(err.message(), "products not found: 4, 9");
    /// ```
    pub fn products_not_found(product_ids: &[ProductId]) -> Self {
        let listed = product_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let message = if product_ids.len() == 1 {
            format!("product not found: {listed}")
        } else {
            format!("products not found: {listed}")
        };
        let ids: Vec<i64> = product_ids.iter().map(|id| id.get()).collect();
        Self::not_found(message).with_details(json!({ "missingProductIds": ids }))
    }

    /// Requested quantity exceeds the authoritative stock for a product.
    pub fn insufficient_stock(product_id: ProductId, available: u32, requested: u32) -> Self {
        Self::new(
            ErrorCode::InsufficientStock,
            format!(
                "insufficient stock for product {product_id}: {available} available, {requested} requested"
            ),
        )
        .with_details(json!({
            "productId": product_id.get(),
            "available": available,
            "requested": requested,
        }))
    }

    /// Order status change rejected by the transition table.
    pub fn invalid_transition(from: OrderStatus, to: OrderStatus) -> Self {
        Self::new(
            ErrorCode::InvalidTransition,
            format!("order status cannot change from {from} to {to}"),
        )
        .with_details(json!({ "from": from.as_str(), "to": to.as_str() }))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDto {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl From<Error> for ErrorDto {
    fn from(value: Error) -> Self {
        Self {
            code: value.code,
            message: value.message,
            details: value.details,
        }
    }
}

impl TryFrom<ErrorDto> for Error {
    type Error = ErrorValidationError;

    fn try_from(value: ErrorDto) -> Result<Self, Self::Error> {
        let ErrorDto {
            code,
            message,
            details,
        } = value;

        let mut error = Error::try_new(code, message)?;
        error.details = details;
        Ok(error)
    }
}

#[cfg(test)]
mod tests;
