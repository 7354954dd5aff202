//! Port for authoritative product reads.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Product, ProductId};

define_port_error! {
    /// Errors raised by product repository adapters.
    pub enum ProductRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "product repository connection failed: {message}",
        /// Query failed during execution or returned malformed rows.
        Query { message: String } =>
            "product repository query failed: {message}",
    }
}

/// Port for reading current product price and stock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find one product by id.
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ProductRepositoryError>;

    /// Fetch every listed product in one query. Unknown ids are simply absent
    /// from the result.
    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError>;
}
