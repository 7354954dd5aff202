//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the product and order repository ports,
//! backed by PostgreSQL through `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. Business rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: Diesel and pool failures are mapped onto the
//!   ports' error enums.
//!
//! # Example
//!
//! ```no_run
//! use storefront::outbound::persistence::{
//!     DbPool, DieselOrderRepository, DieselProductRepository, PoolConfig,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/storefront")).await?;
//! let products = DieselProductRepository::new(pool.clone());
//! let orders = DieselOrderRepository::new(pool);
//! # let _ = (products, orders);
//! # Ok(())
//! # }
//! ```

mod diesel_helpers;
mod diesel_order_repository;
mod diesel_product_repository;
mod models;
mod pool;
mod schema;

pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
