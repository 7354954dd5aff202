//! Catalogue product as consulted by the cart and checkout core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// Authoritative product record read from the relational store.
///
/// `price` and `stock_quantity` are the single source of truth; cart
/// snapshots are always re-checked against them before a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: u32,
    pub image_ref: Option<String>,
}

impl Product {
    /// Whether `requested` units can be served from current stock.
    pub fn can_supply(&self, requested: u32) -> bool {
        requested <= self.stock_quantity
    }
}
