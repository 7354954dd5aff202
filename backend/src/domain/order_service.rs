//! Order creation and status service.
//!
//! Checkout never trusts a cart: products are re-read in one batch, stock is
//! re-checked against those rows, and the order is priced from them. The
//! resulting [`OrderUnitOfWork`] is committed through the order repository,
//! whose adapter re-guards every stock decrement inside the transaction.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{
    OrderCommand, OrderRepository, OrderRepositoryError, ProductRepository,
    ProductRepositoryError,
};
use crate::domain::{
    CustomerId, Error, OrderId, OrderItem, OrderStatus, OrderUnitOfWork, PlacedOrder, ProductId,
};

/// Order service implementing the order driving port.
#[derive(Clone)]
pub struct OrderService<P, O> {
    products: Arc<P>,
    orders: Arc<O>,
    clock: Arc<dyn Clock>,
}

impl<P, O> OrderService<P, O> {
    /// Create a new service over the product and order repositories.
    pub fn new(products: Arc<P>, orders: Arc<O>, clock: Arc<dyn Clock>) -> Self {
        Self {
            products,
            orders,
            clock,
        }
    }
}

fn map_product_error(error: ProductRepositoryError) -> Error {
    match error {
        ProductRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("product repository unavailable: {message}"))
        }
        ProductRepositoryError::Query { message } => {
            Error::internal(format!("product repository error: {message}"))
        }
    }
}

fn map_order_error(error: OrderRepositoryError) -> Error {
    match error {
        OrderRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("order repository unavailable: {message}"))
        }
        OrderRepositoryError::Query { message } => {
            Error::internal(format!("order repository error: {message}"))
        }
        OrderRepositoryError::InsufficientStock {
            product_id,
            available,
            requested,
        } => Error::insufficient_stock(ProductId::new(product_id), available, requested),
        OrderRepositoryError::ProductMissing { product_id } => {
            Error::product_not_found(ProductId::new(product_id))
        }
        OrderRepositoryError::CustomerMissing { customer_id } => {
            Error::not_found(format!("customer not found: {customer_id}"))
        }
    }
}

fn order_not_found(order_id: OrderId) -> Error {
    Error::not_found(format!("order not found: {order_id}"))
}

/// Validate an item list and merge repeated products, keeping first-seen
/// order.
fn coalesce_items(items: Vec<OrderItem>) -> Result<Vec<OrderItem>, Error> {
    if items.is_empty() {
        return Err(Error::invalid_request("an order needs at least one item"));
    }

    let mut merged: Vec<OrderItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            return Err(Error::invalid_request(format!(
                "quantity for product {} must be at least 1",
                item.product_id
            )));
        }
        match merged
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => merged.push(item),
        }
    }
    Ok(merged)
}

#[async_trait]
impl<P, O> OrderCommand for OrderService<P, O>
where
    P: ProductRepository,
    O: OrderRepository,
{
    async fn create_order(
        &self,
        customer_id: CustomerId,
        items: Vec<OrderItem>,
    ) -> Result<PlacedOrder, Error> {
        let items = coalesce_items(items)?;
        let ids: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
        let products = self
            .products
            .find_by_ids(&ids)
            .await
            .map_err(map_product_error)?;

        let work = OrderUnitOfWork::stage(customer_id, self.clock.utc(), &items, &products)
            .map_err(|missing| Error::products_not_found(&missing))?;

        if let Some(shortfall) = work.stock_shortfall() {
            info!(
                %customer_id,
                product_id = %shortfall.product_id,
                available = shortfall.available,
                requested = shortfall.requested,
                "order rejected for insufficient stock"
            );
            work.rollback();
            return Err(Error::insufficient_stock(
                shortfall.product_id,
                shortfall.available,
                shortfall.requested,
            ));
        }

        let placed = work
            .commit(self.orders.as_ref())
            .await
            .map_err(map_order_error)?;
        info!(
            order_id = %placed.order.id,
            %customer_id,
            total = %placed.order.total,
            lines = placed.lines.len(),
            "order placed"
        );
        Ok(placed)
    }

    async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<PlacedOrder, Error> {
        let current = self
            .orders
            .find_order(order_id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| order_not_found(order_id))?;

        let from = current.order.status;
        let to = from
            .transition_to(status)
            .map_err(|rejected| Error::invalid_transition(rejected.from, rejected.to))?;

        let updated = self
            .orders
            .update_status(order_id, from, to)
            .await
            .map_err(map_order_error)?
            // Another writer moved the order first; `from` is no longer current.
            .ok_or_else(|| Error::invalid_transition(from, to))?;
        info!(%order_id, %from, %to, "order status changed");
        Ok(updated)
    }

    async fn get_order(&self, order_id: OrderId) -> Result<PlacedOrder, Error> {
        self.orders
            .find_order(order_id)
            .await
            .map_err(map_order_error)?
            .ok_or_else(|| order_not_found(order_id))
    }
}

#[cfg(test)]
#[path = "order_service_tests.rs"]
mod tests;
