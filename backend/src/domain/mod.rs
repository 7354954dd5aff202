//! Domain primitives, aggregates, and services for the cart and checkout core.
//!
//! Purpose: Define strongly typed entities shared by the cache and persistence
//! adapters, and the services that enforce inventory truth on top of them.
//! Types document their invariants and serialisation contracts (serde) in
//! their Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic error payload.
//! - Cart / CartLine: cached cart document with derived totals.
//! - PlacedOrder / OrderStatus: durable orders and their lifecycle.
//! - CartService / OrderService / CheckoutService: driving port
//!   implementations.

pub mod cart;
pub mod error;
pub mod ids;
pub mod order;
pub mod ports;
pub mod product;

mod cart_service;
mod cart_store;
mod checkout_service;
mod order_service;

pub use self::cart::{
    Cart, CartConfig, CartIdentity, CartInvariantError, CartKey, CartKeyValidationError, CartLine,
    CartLineMissing,
};
pub use self::cart_service::CartService;
pub use self::cart_store::{CacheLookup, CartStore};
pub use self::checkout_service::CheckoutService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{CustomerId, OrderId, ProductId, SessionId, SessionIdValidationError};
pub use self::order::{
    InvalidTransition, Order, OrderItem, OrderLine, OrderStatus, OrderUnitOfWork,
    ParseOrderStatusError, PlacedOrder, StagedOrderLine, StockShortfall,
};
pub use self::order_service::OrderService;
pub use self::product::Product;

/// Convenient service result alias.
///
/// # Examples
/// ```
/// use storefront::domain::{DomainResult, Error};
///
/// fn lookup() -> DomainResult<()> {
///     Err(Error::not_found("order 7 not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
