//! Driving port for order creation and fulfilment.

use async_trait::async_trait;

use crate::domain::{CustomerId, Error, OrderId, OrderItem, OrderStatus, PlacedOrder};

/// Order use cases exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Create a `pending` order priced from authoritative product records.
    ///
    /// # Errors
    ///
    /// - `invalid_request` for an empty item list or a zero quantity.
    /// - `not_found` listing every unknown product id.
    /// - `insufficient_stock` naming the first product that cannot be served,
    ///   including when a concurrent checkout consumed the stock.
    /// - `not_found` when the customer does not exist.
    async fn create_order(
        &self,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
    ) -> Result<PlacedOrder, Error>;

    /// Move an order along the status state machine.
    ///
    /// # Errors
    ///
    /// - `not_found` when the order does not exist.
    /// - `invalid_transition` when the table forbids the change or the order
    ///   changed status concurrently.
    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<PlacedOrder, Error>;

    /// Fetch an order with its lines; `not_found` when absent.
    async fn get_order(&self, order_id: OrderId) -> Result<PlacedOrder, Error>;
}
