//! Durable orders and the checkout unit of work.

mod status;
mod unit_of_work;

pub use status::{InvalidTransition, OrderStatus, ParseOrderStatusError};
pub use unit_of_work::{OrderUnitOfWork, StagedOrderLine, StockShortfall};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CustomerId, OrderId, ProductId};

/// Requested product and quantity for checkout. Carries no price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Order header. `total` is fixed at creation and never recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub total: Decimal,
}

/// Audit record of what was charged for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLine {
    /// Charged value of the line.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An order together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl PlacedOrder {
    /// Whether the lines add up to the header total.
    pub fn is_balanced(&self) -> bool {
        let lines_total: Decimal = self.lines.iter().map(OrderLine::line_total).sum();
        lines_total == self.order.total
    }
}
