//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions into domain types validate
//! what the column types cannot express (unsigned quantities, known status
//! names).

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use super::schema::{order_items, orders, products};
use crate::domain::{CustomerId, Order, OrderId, OrderLine, OrderStatus, Product, ProductId};

/// Row struct for reading from the products table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image_ref: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = String;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let stock_quantity = u32::try_from(row.stock_quantity)
            .map_err(|_| format!("product {} has negative stock", row.id))?;
        Ok(Product {
            id: ProductId::new(row.id),
            name: row.name,
            price: row.price,
            stock_quantity,
            image_ref: row.image_ref,
        })
    }
}

/// Row struct for reading from the orders table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderRow {
    pub id: i64,
    pub customer_id: i64,
    pub order_date: DateTime<Utc>,
    pub status: String,
    pub total: Decimal,
}

impl TryFrom<OrderRow> for Order {
    type Error = String;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(|err| format!("{err}"))?;
        Ok(Order {
            id: OrderId::new(row.id),
            customer_id: CustomerId::new(row.customer_id),
            order_date: row.order_date,
            status,
            total: row.total,
        })
    }
}

/// Insertable struct for creating order headers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub(crate) struct NewOrderRow<'a> {
    pub customer_id: i64,
    pub order_date: DateTime<Utc>,
    pub status: &'a str,
    pub total: Decimal,
}

/// Row struct for reading from the order_items table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = order_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OrderItemRow {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl TryFrom<OrderItemRow> for OrderLine {
    type Error = String;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            format!(
                "order {} line for product {} has negative quantity",
                row.order_id, row.product_id
            )
        })?;
        Ok(OrderLine {
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity,
            unit_price: row.unit_price,
        })
    }
}

/// Insertable struct for creating order lines.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = order_items)]
pub(crate) struct NewOrderItemRow {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub unit_price: Decimal,
}

#[cfg(test)]
mod tests {
    //! Row-to-domain conversion guards.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn negative_stock_is_rejected() {
        let row = ProductRow {
            id: 3,
            name: "Lantern".to_owned(),
            price: Decimal::new(4200, 2),
            stock_quantity: -1,
            image_ref: None,
        };
        let err = Product::try_from(row).expect_err("negative stock");
        assert!(err.contains("product 3"));
    }

    #[rstest]
    fn unknown_status_is_rejected() {
        let row = OrderRow {
            id: 1,
            customer_id: 2,
            order_date: Utc::now(),
            status: "lost".to_owned(),
            total: Decimal::ZERO,
        };
        let err = Order::try_from(row).expect_err("unknown status");
        assert!(err.contains("lost"));
    }

    #[rstest]
    fn order_row_converts() {
        let row = OrderRow {
            id: 1,
            customer_id: 2,
            order_date: Utc::now(),
            status: "shipped".to_owned(),
            total: Decimal::new(999, 2),
        };
        let order = Order::try_from(row).expect("valid row");
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.customer_id, CustomerId::new(2));
    }
}
