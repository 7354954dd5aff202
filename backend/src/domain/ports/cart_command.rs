//! Driving port for cart operations.
//!
//! The surrounding HTTP layer resolves the caller's identity and calls this
//! port; every mutation validates against live product stock before the
//! cached cart is rewritten.

use async_trait::async_trait;

use crate::domain::{Cart, CartIdentity, CustomerId, Error, ProductId, SessionId};

/// Cart use cases exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartCommand: Send + Sync {
    /// Read the cart for an identity; a missing cart is empty, not an error.
    async fn get_cart(&self, identity: &CartIdentity) -> Result<Cart, Error>;

    /// Add units of a product.
    ///
    /// # Errors
    ///
    /// - `not_found` when the product does not exist.
    /// - `insufficient_stock` when the cumulative cart quantity would exceed
    ///   current stock.
    /// - `invalid_request` when `quantity` is zero.
    async fn add_item(
        &self,
        identity: &CartIdentity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, Error>;

    /// Replace a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// - `not_found` when the product has no line in the cart.
    /// - `insufficient_stock` when `quantity` exceeds current stock.
    async fn update_item(
        &self,
        identity: &CartIdentity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, Error>;

    /// Remove a line; `not_found` when absent.
    async fn remove_item(&self, identity: &CartIdentity, product_id: ProductId)
    -> Result<Cart, Error>;

    /// Delete the cart entirely.
    async fn clear(&self, identity: &CartIdentity) -> Result<(), Error>;

    /// Fold an anonymous session cart into a user's cart at login.
    ///
    /// Quantities for shared products are summed without consulting stock.
    /// An empty session cart returns the user cart untouched with no writes.
    async fn merge(&self, user_id: CustomerId, session_id: &SessionId) -> Result<Cart, Error>;
}
