//! Port for the key-value cache holding serialised cart documents.
use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::CartKey;

define_port_error! {
    /// Errors surfaced by the cart cache adapter.
    pub enum CartCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "cart cache backend failure: {message}",
        /// A cache command was rejected.
        Command { message: String } => "cart cache command failed: {message}",
    }
}

/// String-valued key-value store with per-key expiry.
///
/// Implementations perform no serialisation; the cart store owns the
/// document format.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartCache: Send + Sync {
    /// Read the raw value stored under `key`; `None` on a miss.
    async fn get(&self, key: &CartKey) -> Result<Option<String>, CartCacheError>;

    /// Write `value` under `key`, replacing any previous value and expiry.
    async fn set_with_ttl(
        &self,
        key: &CartKey,
        ttl: Duration,
        value: &str,
    ) -> Result<(), CartCacheError>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &CartKey) -> Result<(), CartCacheError>;
}
