//! Cart mutation service.
//!
//! Implements [`CartCommand`] on top of a [`CartStore`] and the product
//! repository. Every mutation re-reads the product so stock and existence are
//! judged against the relational store, never against the cached snapshot.
//! Totals are recomputed by [`Cart`] itself before each save.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{CartCache, CartCommand, ProductRepository, ProductRepositoryError};
use crate::domain::{
    Cart, CartConfig, CartIdentity, CartLineMissing, CartStore, CustomerId, Error, Product,
    ProductId, SessionId,
};

/// Cart service implementing the cart driving port.
#[derive(Clone)]
pub struct CartService<C, P> {
    store: CartStore<C>,
    products: Arc<P>,
}

impl<C, P> CartService<C, P> {
    /// Create a new service over a cache and the product repository.
    pub fn new(cache: Arc<C>, products: Arc<P>, config: CartConfig) -> Self {
        Self {
            store: CartStore::new(cache, config),
            products,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &CartStore<C> {
        &self.store
    }
}

impl<C, P> CartService<C, P>
where
    C: CartCache,
    P: ProductRepository,
{
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

    fn line_missing(missing: CartLineMissing) -> Error {
        Error::not_found(missing.to_string())
    }

    async fn load_product(&self, product_id: ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(product_id)
            .await
            .map_err(Self::map_product_error)?
            .ok_or_else(|| Error::product_not_found(product_id))
    }

    fn ensure_stock(product: &Product, requested: u32) -> Result<(), Error> {
        if product.can_supply(requested) {
            return Ok(());
        }
        info!(
            product_id = %product.id,
            available = product.stock_quantity,
            requested,
            "cart mutation rejected for insufficient stock"
        );
        Err(Error::insufficient_stock(
            product.id,
            product.stock_quantity,
            requested,
        ))
    }

    async fn persist(&self, identity: &CartIdentity, cart: Cart) -> Result<Cart, Error> {
        self.store.save(identity, &cart).await?;
        Ok(cart)
    }
}

#[async_trait]
impl<C, P> CartCommand for CartService<C, P>
where
    C: CartCache,
    P: ProductRepository,
{
    async fn get_cart(&self, identity: &CartIdentity) -> Result<Cart, Error> {
        self.store.get(identity).await
    }

    async fn add_item(
        &self,
        identity: &CartIdentity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, Error> {
        if quantity == 0 {
            return Err(Error::invalid_request("quantity must be at least 1"));
        }
        let product = self.load_product(product_id).await?;
        let cart = self.store.get(identity).await?;

        let cumulative = cart.quantity_of(product_id).saturating_add(quantity);
        Self::ensure_stock(&product, cumulative)?;

        debug!(cart = %identity, %product_id, quantity, "adding cart item");
        self.persist(identity, cart.with_product_added(&product, quantity))
            .await
    }

    async fn update_item(
        &self,
        identity: &CartIdentity,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, Error> {
        let cart = self.store.get(identity).await?;
        if cart.line(product_id).is_none() {
            return Err(Self::line_missing(CartLineMissing { product_id }));
        }

        if quantity > 0 {
            let product = self.load_product(product_id).await?;
            Self::ensure_stock(&product, quantity)?;
        }

        debug!(cart = %identity, %product_id, quantity, "updating cart item");
        let updated = cart
            .with_quantity(product_id, quantity)
            .map_err(Self::line_missing)?;
        self.persist(identity, updated).await
    }

    async fn remove_item(
        &self,
        identity: &CartIdentity,
        product_id: ProductId,
    ) -> Result<Cart, Error> {
        let cart = self.store.get(identity).await?;
        let updated = cart
            .without_product(product_id)
            .map_err(Self::line_missing)?;
        debug!(cart = %identity, %product_id, "removed cart item");
        self.persist(identity, updated).await
    }

    async fn clear(&self, identity: &CartIdentity) -> Result<(), Error> {
        self.store.delete(identity).await
    }

    async fn merge(&self, user_id: CustomerId, session_id: &SessionId) -> Result<Cart, Error> {
        let session = CartIdentity::Session(session_id.clone());
        let user = CartIdentity::User(user_id);

        let session_cart = self.store.get(&session).await?;
        let user_cart = self.store.get(&user).await?;
        if session_cart.is_empty() {
            return Ok(user_cart);
        }

        let moved_lines = session_cart.lines().len();
        let merged = user_cart.merged_with(session_cart);
        self.store.save(&user, &merged).await?;
        self.store.delete(&session).await?;
        info!(%user_id, moved_lines, line_count = merged.line_count(), "merged session cart");
        Ok(merged)
    }
}

#[cfg(test)]
#[path = "cart_service_tests.rs"]
mod tests;
