//! Staged order creation.
//!
//! Checkout stages every side effect of an order (header, lines, stock
//! decrements, customer statistics) in an [`OrderUnitOfWork`] before anything
//! touches storage. The unit is then either committed through an
//! [`OrderRepository`], which applies it as one all-or-nothing transaction, or
//! rolled back, which discards it without side effects.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{OrderItem, PlacedOrder};
use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{CustomerId, Product, ProductId};

/// One order line priced from the authoritative product record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Decimal,
    available_stock: u32,
}

impl StagedOrderLine {
    /// Value charged for the line.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Stock observed when the line was staged.
    pub fn available_stock(&self) -> u32 {
        self.available_stock
    }
}

/// First line whose requested quantity exceeds observed stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockShortfall {
    pub product_id: ProductId,
    pub available: u32,
    pub requested: u32,
}

/// All writes needed to place one order, applied atomically on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUnitOfWork {
    customer_id: CustomerId,
    order_date: DateTime<Utc>,
    total: Decimal,
    lines: Vec<StagedOrderLine>,
}

impl OrderUnitOfWork {
    /// Price `items` against freshly fetched `products`.
    ///
    /// Returns every requested product id the catalogue did not return, in
    /// request order, when any are missing.
    pub fn stage(
        customer_id: CustomerId,
        order_date: DateTime<Utc>,
        items: &[OrderItem],
        products: &[Product],
    ) -> Result<Self, Vec<ProductId>> {
        let by_id: HashMap<ProductId, &Product> =
            products.iter().map(|product| (product.id, product)).collect();

        let mut missing = Vec::new();
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            match by_id.get(&item.product_id) {
                Some(product) => lines.push(StagedOrderLine {
                    product_id: product.id,
                    quantity: item.quantity,
                    unit_price: product.price,
                    available_stock: product.stock_quantity,
                }),
                None if !missing.contains(&item.product_id) => missing.push(item.product_id),
                None => {}
            }
        }
        if !missing.is_empty() {
            return Err(missing);
        }

        let total = lines.iter().map(StagedOrderLine::line_total).sum();
        Ok(Self {
            customer_id,
            order_date,
            total,
            lines,
        })
    }

    /// Customer whose aggregates the order updates.
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Timestamp recorded as both order date and last purchase date.
    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    /// Order total; equals the sum of the staged line totals.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Staged lines in request order.
    pub fn lines(&self) -> &[StagedOrderLine] {
        &self.lines
    }

    /// First line that cannot be served from the stock observed at staging.
    pub fn stock_shortfall(&self) -> Option<StockShortfall> {
        self.lines
            .iter()
            .find(|line| line.quantity > line.available_stock)
            .map(|line| StockShortfall {
                product_id: line.product_id,
                available: line.available_stock,
                requested: line.quantity,
            })
    }

    /// Stock decrements in ascending product order.
    ///
    /// Adapters lock product rows in this order so concurrent checkouts over
    /// overlapping products cannot deadlock.
    pub fn stock_decrements(&self) -> Vec<(ProductId, u32)> {
        let mut decrements: Vec<_> = self
            .lines
            .iter()
            .map(|line| (line.product_id, line.quantity))
            .collect();
        decrements.sort_by_key(|(product_id, _)| *product_id);
        decrements
    }

    /// Apply every staged write in one storage transaction.
    pub async fn commit<R>(self, repository: &R) -> Result<PlacedOrder, OrderRepositoryError>
    where
        R: OrderRepository + ?Sized,
    {
        let customer_id = self.customer_id;
        let result = repository.commit(self).await;
        if let Err(error) = &result {
            warn!(%customer_id, %error, "order transaction rolled back");
        }
        result
    }

    /// Discard the staged writes. Nothing has reached storage yet.
    pub fn rollback(self) {
        debug!(
            customer_id = %self.customer_id,
            lines = self.lines.len(),
            "discarded staged order"
        );
    }
}
