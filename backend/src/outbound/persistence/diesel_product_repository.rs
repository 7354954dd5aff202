//! PostgreSQL-backed product reads.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ProductRepository, ProductRepositoryError};
use crate::domain::{Product, ProductId};

use super::diesel_helpers::{RepositoryFailure, collect_rows};
use super::models::ProductRow;
use super::pool::DbPool;
use super::schema::products;

/// Diesel-backed implementation of the `ProductRepository` port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use storefront::outbound::persistence::{DbPool, DieselProductRepository, PoolConfig};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/storefront")).await?;
    /// let repository = DieselProductRepository::new(pool);
    /// # let _ = repository;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let mut conn = self.pool.get().await.map_err(ProductRepositoryError::from_pool)?;
        let row: Option<ProductRow> = products::table
            .find(id.get())
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(ProductRepositoryError::from_diesel)?;

        row.map(Product::try_from)
            .transpose()
            .map_err(ProductRepositoryError::query)
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw_ids: Vec<i64> = ids.iter().map(|id| id.get()).collect();

        let mut conn = self.pool.get().await.map_err(ProductRepositoryError::from_pool)?;
        let rows: Vec<ProductRow> = products::table
            .filter(products::id.eq_any(raw_ids))
            .select(ProductRow::as_select())
            .order_by(products::id)
            .load(&mut conn)
            .await
            .map_err(ProductRepositoryError::from_diesel)?;

        collect_rows(rows.into_iter().map(Product::try_from))
    }
}
