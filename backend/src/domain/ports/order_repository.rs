//! Port for durable order storage.
//!
//! Adapters apply an [`OrderUnitOfWork`] as a single transaction: stock
//! decrements, customer statistics, the order header, and its lines either
//! all persist or none do.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{OrderId, OrderStatus, OrderUnitOfWork, PlacedOrder};

define_port_error! {
    /// Errors raised by order repository adapters.
    pub enum OrderRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "order repository query failed: {message}",
        /// A concurrent writer consumed stock between validation and commit.
        InsufficientStock { product_id: i64, available: u32, requested: u32 } =>
            "insufficient stock for product {product_id}: {available} available, {requested} requested",
        /// A staged product no longer exists.
        ProductMissing { product_id: i64 } =>
            "product {product_id} disappeared during checkout",
        /// The ordering customer does not exist.
        CustomerMissing { customer_id: i64 } =>
            "customer {customer_id} not found",
    }
}

/// Port for committing and reading orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Apply the unit of work atomically and return the stored order.
    async fn commit(&self, work: OrderUnitOfWork) -> Result<PlacedOrder, OrderRepositoryError>;

    /// Find an order with its lines.
    async fn find_order(&self, id: OrderId) -> Result<Option<PlacedOrder>, OrderRepositoryError>;

    /// Move an order from `from` to `to`.
    ///
    /// The write is conditional on the stored status still being `from`;
    /// `None` means no row matched (the order vanished or changed status
    /// concurrently).
    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<PlacedOrder>, OrderRepositoryError>;
}
