//! Checkout: turn a customer's cart into an order.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{CartCommand, OrderCommand};
use crate::domain::{CartIdentity, CustomerId, Error, PlacedOrder};

/// Composes the cart and order services for the checkout flow.
///
/// Only the cart's product ids and quantities reach order creation; the
/// cached price snapshots are discarded and re-read from the catalogue.
#[derive(Clone)]
pub struct CheckoutService<C, O> {
    carts: Arc<C>,
    orders: Arc<O>,
}

impl<C, O> CheckoutService<C, O> {
    /// Create a checkout flow over the two driving ports.
    pub fn new(carts: Arc<C>, orders: Arc<O>) -> Self {
        Self { carts, orders }
    }
}

impl<C, O> CheckoutService<C, O>
where
    C: CartCommand,
    O: OrderCommand,
{
    /// Place an order for everything in the customer's cart, then clear it.
    ///
    /// Once the order is committed, a failure to clear the cart is logged
    /// and swallowed so a retry cannot place the order twice.
    ///
    /// # Errors
    ///
    /// `invalid_request` for an empty cart, otherwise whatever order
    /// creation reports.
    pub async fn checkout(&self, customer_id: CustomerId) -> Result<PlacedOrder, Error> {
        let identity = CartIdentity::User(customer_id);
        let cart = self.carts.get_cart(&identity).await?;
        if cart.is_empty() {
            return Err(Error::invalid_request("cannot check out an empty cart"));
        }

        let placed = self
            .orders
            .create_order(customer_id, cart.to_order_items())
            .await?;

        if let Err(error) = self.carts.clear(&identity).await {
            warn!(
                %customer_id,
                order_id = %placed.order.id,
                %error,
                "order placed but cart could not be cleared"
            );
        }
        Ok(placed)
    }
}
