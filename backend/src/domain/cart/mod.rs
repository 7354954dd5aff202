//! Shopping cart document and its derived totals.
//!
//! A cart is a denormalised, cache-resident document. Line prices are
//! snapshots taken when a product is first added and are never used to price
//! an order. `total` and `line_count` are recomputed from the line list after
//! every mutation and verified whenever a document is decoded, so a stale or
//! tampered cache entry never surfaces as a valid cart.

mod config;
mod identity;

pub use config::CartConfig;
pub use identity::{CartIdentity, CartKey, CartKeyValidationError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{OrderItem, Product, ProductId};

/// One product entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub display_name: String,
    pub image_ref: Option<String>,
}

impl CartLine {
    /// Snapshot a product's current price and name.
    pub fn snapshot(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            quantity,
            unit_price: product.price,
            display_name: product.name.clone(),
            image_ref: product.image_ref.clone(),
        }
    }

    /// Monetary value of the line at its snapshot price.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Reasons a decoded cart document is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartInvariantError {
    /// A line carries a zero quantity.
    #[error("cart line for product {product_id} has zero quantity")]
    ZeroQuantity { product_id: ProductId },
    /// The same product appears on more than one line.
    #[error("product {product_id} appears on more than one cart line")]
    DuplicateProduct { product_id: ProductId },
    /// Stored total disagrees with the line list.
    #[error("cart total {stored} does not match computed total {computed}")]
    TotalMismatch { stored: Decimal, computed: Decimal },
    /// Stored line count disagrees with the line list.
    #[error("cart line count {stored} does not match computed count {computed}")]
    LineCountMismatch { stored: u32, computed: u32 },
}

/// Error returned when a mutation targets a product that has no cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("product {product_id} is not in the cart")]
pub struct CartLineMissing {
    pub product_id: ProductId,
}

/// Shopping cart with derived totals.
///
/// Identity is not part of the document; it is implied by the cache key the
/// cart is stored under (see [`CartKey`]).
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use storefront::domain::{Cart, Product, ProductId};
///
/// let product = Product {
///     id: ProductId::new(1),
///     name: "Trail mug".to_owned(),
///     price: Decimal::new(1250, 2),
///     stock_quantity: 10,
///     image_ref: None,
/// };
/// let cart = Cart::empty().with_product_added(&product, 2);
/// assert_eq!(cart.total(), Decimal::new(2500, 2));
/// assert_eq!(cart.line_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CartDocument", into = "CartDocument")]
pub struct Cart {
    lines: Vec<CartLine>,
    total: Decimal,
    line_count: u32,
}

impl Default for Cart {
    fn default() -> Self {
        Self::empty()
    }
}

impl Cart {
    /// The state of an identity that has never added anything.
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total: Decimal::ZERO,
            line_count: 0,
        }
    }

    /// Build a cart from lines, deriving totals.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let (total, line_count) = compute_totals(&lines);
        Self {
            lines,
            total,
            line_count,
        }
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Sum of quantities over all lines.
    pub fn line_count(&self) -> u32 {
        self.line_count
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find the line for a product.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    /// Quantity currently held for a product, zero when absent.
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map_or(0, |line| line.quantity)
    }

    /// Add `quantity` units of a product.
    ///
    /// Existing lines keep their original price snapshot and only grow in
    /// quantity; new products append a fresh snapshot.
    pub fn with_product_added(mut self, product: &Product, quantity: u32) -> Self {
        match self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.lines.push(CartLine::snapshot(product, quantity)),
        }
        self.recompute()
    }

    /// Set the quantity of an existing line; zero removes the line.
    pub fn with_quantity(mut self, product_id: ProductId, quantity: u32) -> Result<Self, CartLineMissing> {
        if quantity == 0 {
            return self.without_product(product_id);
        }
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
            .ok_or(CartLineMissing { product_id })?;
        line.quantity = quantity;
        Ok(self.recompute())
    }

    /// Remove the line for a product.
    pub fn without_product(mut self, product_id: ProductId) -> Result<Self, CartLineMissing> {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        if self.lines.len() == before {
            return Err(CartLineMissing { product_id });
        }
        Ok(self.recompute())
    }

    /// Union another cart into this one.
    ///
    /// Shared products sum their quantities and keep this cart's snapshot;
    /// products only present in `other` are appended as-is. Stock is not
    /// consulted.
    pub fn merged_with(mut self, other: Cart) -> Self {
        for incoming in other.lines {
            match self
                .lines
                .iter_mut()
                .find(|line| line.product_id == incoming.product_id)
            {
                Some(line) => line.quantity = line.quantity.saturating_add(incoming.quantity),
                None => self.lines.push(incoming),
            }
        }
        self.recompute()
    }

    /// Item list handed to order creation. Prices are deliberately dropped.
    pub fn to_order_items(&self) -> Vec<OrderItem> {
        self.lines
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect()
    }

    /// Check the derived-total invariants against the line list.
    pub fn verify(&self) -> Result<(), CartInvariantError> {
        let mut seen = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if line.quantity == 0 {
                return Err(CartInvariantError::ZeroQuantity {
                    product_id: line.product_id,
                });
            }
            if seen.contains(&line.product_id) {
                return Err(CartInvariantError::DuplicateProduct {
                    product_id: line.product_id,
                });
            }
            seen.push(line.product_id);
        }

        let (total, line_count) = compute_totals(&self.lines);
        if total != self.total {
            return Err(CartInvariantError::TotalMismatch {
                stored: self.total,
                computed: total,
            });
        }
        if line_count != self.line_count {
            return Err(CartInvariantError::LineCountMismatch {
                stored: self.line_count,
                computed: line_count,
            });
        }
        Ok(())
    }

    fn recompute(self) -> Self {
        Self::from_lines(self.lines)
    }
}

fn compute_totals(lines: &[CartLine]) -> (Decimal, u32) {
    lines.iter().fold((Decimal::ZERO, 0_u32), |(total, count), line| {
        (total + line.line_total(), count.saturating_add(line.quantity))
    })
}

/// Wire shape of a cached cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CartDocument {
    lines: Vec<CartLine>,
    total: Decimal,
    line_count: u32,
}

impl From<Cart> for CartDocument {
    fn from(value: Cart) -> Self {
        Self {
            lines: value.lines,
            total: value.total,
            line_count: value.line_count,
        }
    }
}

impl TryFrom<CartDocument> for Cart {
    type Error = CartInvariantError;

    fn try_from(value: CartDocument) -> Result<Self, Self::Error> {
        let cart = Cart {
            lines: value.lines,
            total: value.total,
            line_count: value.line_count,
        };
        cart.verify()?;
        Ok(cart)
    }
}
