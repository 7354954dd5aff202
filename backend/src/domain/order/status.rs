//! Order status lifecycle and its transition table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fulfilment state of an order.
///
/// Every order starts as [`OrderStatus::Pending`]. `Cancelled` and `Refunded`
/// are terminal.
///
/// # Example
///
/// ```
/// # use storefront::domain::OrderStatus;
/// assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
/// assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
/// assert_eq!(OrderStatus::Delivered.to_string(), "delivered");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// All status variants.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// States reachable in one step from this one.
    pub fn allowed_transitions(&self) -> &'static [OrderStatus] {
        match self {
            Self::Pending => &[Self::Processing, Self::Cancelled],
            Self::Processing => &[Self::Shipped, Self::Cancelled],
            Self::Shipped => &[Self::Delivered],
            Self::Delivered => &[Self::Refunded],
            Self::Cancelled | Self::Refunded => &[],
        }
    }

    /// Whether `next` is reachable in one step.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Validate a transition, returning the new status.
    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("order status cannot change from {from} to {to}")]
pub struct InvalidTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOrderStatusError {
    /// The invalid input string.
    pub input: String,
}

impl fmt::Display for ParseOrderStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variants: Vec<_> = OrderStatus::ALL.iter().map(OrderStatus::as_str).collect();
        write!(
            f,
            "invalid order status '{}'; expected one of: {}",
            self.input,
            variants.join(", ")
        )
    }
}

impl std::error::Error for ParseOrderStatusError {}

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseOrderStatusError {
                input: s.to_owned(),
            })
    }
}
