//! Cache-backed cart storage.
//!
//! One cart document lives under each identity's [`CartKey`]. An absent key
//! is the empty cart, so the read path never fails on a miss; every save
//! re-applies the configured TTL.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ports::{CartCache, CartCacheError};
use crate::domain::{Cart, CartConfig, CartIdentity, CartKey, Error};

/// Outcome of reading a cart key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A valid cart document was stored under the key.
    Hit(Cart),
    /// Nothing usable was stored under the key.
    Miss,
}

impl CacheLookup {
    /// Collapse the lookup into a cart, mapping a miss to the empty cart.
    pub fn into_cart(self) -> Cart {
        match self {
            Self::Hit(cart) => cart,
            Self::Miss => Cart::empty(),
        }
    }

    /// Whether a document was found.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Reads and writes cart documents through an injected cache handle.
#[derive(Clone)]
pub struct CartStore<C> {
    cache: Arc<C>,
    config: CartConfig,
}

impl<C> CartStore<C> {
    /// Create a store over the given cache.
    pub fn new(cache: Arc<C>, config: CartConfig) -> Self {
        Self { cache, config }
    }

    /// Expiry settings applied on save.
    pub fn config(&self) -> CartConfig {
        self.config
    }
}

impl<C> CartStore<C>
where
    C: CartCache,
{
    fn map_cache_error(error: CartCacheError) -> Error {
        match error {
            CartCacheError::Backend { message } => {
                Error::service_unavailable(format!("cart cache unavailable: {message}"))
            }
            CartCacheError::Command { message } => {
                Error::internal(format!("cart cache error: {message}"))
            }
        }
    }

    /// Read the document stored for `identity`.
    ///
    /// A document that fails to decode or whose totals disagree with its
    /// lines is deleted and reported as a miss.
    pub async fn lookup(&self, identity: &CartIdentity) -> Result<CacheLookup, Error> {
        let key = identity.cache_key();
        let Some(raw) = self
            .cache
            .get(&key)
            .await
            .map_err(Self::map_cache_error)?
        else {
            return Ok(CacheLookup::Miss);
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => Ok(CacheLookup::Hit(cart)),
            Err(error) => {
                warn!(cart_key = %key, %error, "discarding corrupt cart document");
                self.remove(&key).await?;
                Ok(CacheLookup::Miss)
            }
        }
    }

    /// Read the cart for `identity`; a miss is the empty cart.
    pub async fn get(&self, identity: &CartIdentity) -> Result<Cart, Error> {
        self.lookup(identity).await.map(CacheLookup::into_cart)
    }

    /// Overwrite the cart for `identity` and reset its expiry.
    pub async fn save(&self, identity: &CartIdentity, cart: &Cart) -> Result<(), Error> {
        let key = identity.cache_key();
        let document = serde_json::to_string(cart)
            .map_err(|err| Error::internal(format!("failed to serialise cart: {err}")))?;
        self.cache
            .set_with_ttl(&key, self.config.ttl(), &document)
            .await
            .map_err(Self::map_cache_error)?;
        debug!(
            cart_key = %key,
            lines = cart.lines().len(),
            line_count = cart.line_count(),
            "saved cart"
        );
        Ok(())
    }

    /// Remove the cart for `identity`. Removing an absent cart succeeds.
    pub async fn delete(&self, identity: &CartIdentity) -> Result<(), Error> {
        self.remove(&identity.cache_key()).await
    }

    async fn remove(&self, key: &CartKey) -> Result<(), Error> {
        self.cache
            .delete(key)
            .await
            .map_err(Self::map_cache_error)?;
        debug!(cart_key = %key, "deleted cart");
        Ok(())
    }
}
