//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`CartCache`, `ProductRepository`, `OrderRepository`) are
//! implemented by outbound adapters; driving ports (`CartCommand`,
//! `OrderCommand`) are implemented by domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod cart_cache;
mod cart_command;
mod order_command;
mod order_repository;
mod product_repository;

#[cfg(test)]
pub use cart_cache::MockCartCache;
pub use cart_cache::{CartCache, CartCacheError};
#[cfg(test)]
pub use cart_command::MockCartCommand;
pub use cart_command::CartCommand;
#[cfg(test)]
pub use order_command::MockOrderCommand;
pub use order_command::OrderCommand;
#[cfg(test)]
pub use order_repository::MockOrderRepository;
pub use order_repository::{OrderRepository, OrderRepositoryError};
#[cfg(test)]
pub use product_repository::MockProductRepository;
pub use product_repository::{ProductRepository, ProductRepositoryError};
