//! PostgreSQL-backed order storage.
//!
//! `commit` applies an [`OrderUnitOfWork`] inside one transaction. Stock is
//! decremented with a conditional `UPDATE ... WHERE stock_quantity >= n`, so
//! under `READ COMMITTED` a concurrent checkout that consumed the stock first
//! makes the update match zero rows and the whole transaction rolls back.
//! Product rows are touched in ascending id order so overlapping checkouts
//! queue behind each other instead of deadlocking.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{OrderRepository, OrderRepositoryError};
use crate::domain::{Order, OrderId, OrderLine, OrderStatus, OrderUnitOfWork, PlacedOrder};

use super::diesel_helpers::{RepositoryFailure, collect_rows, quantity_for_db};
use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow};
use super::pool::DbPool;
use super::schema::{customers, order_items, orders, products};

/// Diesel-backed implementation of the `OrderRepository` port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside the checkout transaction.
#[derive(Debug)]
enum CommitError {
    Diesel(diesel::result::Error),
    Rejected(OrderRepositoryError),
}

impl From<diesel::result::Error> for CommitError {
    fn from(value: diesel::result::Error) -> Self {
        Self::Diesel(value)
    }
}

impl From<CommitError> for OrderRepositoryError {
    fn from(value: CommitError) -> Self {
        match value {
            CommitError::Diesel(error) => OrderRepositoryError::from_diesel(error),
            CommitError::Rejected(error) => error,
        }
    }
}

fn rejected_quantity(message: String) -> CommitError {
    CommitError::Rejected(OrderRepositoryError::query(message))
}

/// Decrement stock for one product, failing if it would go negative.
async fn decrement_stock(
    conn: &mut AsyncPgConnection,
    product_id: i64,
    quantity: u32,
) -> Result<(), CommitError> {
    let amount = quantity_for_db(quantity).map_err(rejected_quantity)?;
    let updated = diesel::update(
        products::table
            .filter(products::id.eq(product_id))
            .filter(products::stock_quantity.ge(amount)),
    )
    .set(products::stock_quantity.eq(products::stock_quantity - amount))
    .execute(conn)
    .await?;
    if updated > 0 {
        return Ok(());
    }

    let current: Option<i32> = products::table
        .find(product_id)
        .select(products::stock_quantity)
        .first(conn)
        .await
        .optional()?;
    let rejection = match current {
        Some(available) => OrderRepositoryError::insufficient_stock(
            product_id,
            u32::try_from(available).unwrap_or(0),
            quantity,
        ),
        None => OrderRepositoryError::product_missing(product_id),
    };
    Err(CommitError::Rejected(rejection))
}

async fn insert_order(
    conn: &mut AsyncPgConnection,
    work: &OrderUnitOfWork,
) -> Result<(OrderRow, Vec<OrderItemRow>), CommitError> {
    for (product_id, quantity) in work.stock_decrements() {
        decrement_stock(conn, product_id.get(), quantity).await?;
    }

    let customer_id = work.customer_id().get();
    let updated = diesel::update(customers::table.find(customer_id))
        .set((
            customers::total_orders.eq(customers::total_orders + 1),
            customers::total_spent.eq(customers::total_spent + work.total()),
            customers::last_purchase_date.eq(Some(work.order_date())),
        ))
        .execute(conn)
        .await?;
    if updated == 0 {
        return Err(CommitError::Rejected(
            OrderRepositoryError::customer_missing(customer_id),
        ));
    }

    let order_row: OrderRow = diesel::insert_into(orders::table)
        .values(&NewOrderRow {
            customer_id,
            order_date: work.order_date(),
            status: OrderStatus::Pending.as_str(),
            total: work.total(),
        })
        .returning(OrderRow::as_returning())
        .get_result(conn)
        .await?;

    let new_items = work
        .lines()
        .iter()
        .map(|line| {
            Ok(NewOrderItemRow {
                order_id: order_row.id,
                product_id: line.product_id.get(),
                quantity: quantity_for_db(line.quantity)?,
                unit_price: line.unit_price,
            })
        })
        .collect::<Result<Vec<_>, String>>()
        .map_err(rejected_quantity)?;

    let item_rows: Vec<OrderItemRow> = diesel::insert_into(order_items::table)
        .values(&new_items)
        .returning(OrderItemRow::as_returning())
        .get_results(conn)
        .await?;

    Ok((order_row, item_rows))
}

async fn load_lines(
    conn: &mut AsyncPgConnection,
    order_id: i64,
) -> Result<Vec<OrderItemRow>, OrderRepositoryError> {
    order_items::table
        .filter(order_items::order_id.eq(order_id))
        .select(OrderItemRow::as_select())
        .order_by(order_items::id)
        .load(conn)
        .await
        .map_err(OrderRepositoryError::from_diesel)
}

fn to_placed_order(
    order_row: OrderRow,
    item_rows: Vec<OrderItemRow>,
) -> Result<PlacedOrder, OrderRepositoryError> {
    let order = Order::try_from(order_row).map_err(OrderRepositoryError::query)?;
    let lines =
        collect_rows::<_, OrderRepositoryError>(item_rows.into_iter().map(OrderLine::try_from))?;
    Ok(PlacedOrder { order, lines })
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn commit(&self, work: OrderUnitOfWork) -> Result<PlacedOrder, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(OrderRepositoryError::from_pool)?;

        let (order_row, item_rows) = conn
            .transaction::<_, CommitError, _>(|conn| {
                async move { insert_order(conn, &work).await }.scope_boxed()
            })
            .await?;

        debug!(order_id = order_row.id, lines = item_rows.len(), "order committed");
        to_placed_order(order_row, item_rows)
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<PlacedOrder>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(OrderRepositoryError::from_pool)?;
        let Some(order_row) = orders::table
            .find(id.get())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(OrderRepositoryError::from_diesel)?
        else {
            return Ok(None);
        };

        let item_rows = load_lines(&mut conn, order_row.id).await?;
        to_placed_order(order_row, item_rows).map(Some)
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<PlacedOrder>, OrderRepositoryError> {
        let mut conn = self.pool.get().await.map_err(OrderRepositoryError::from_pool)?;
        let Some(order_row) = diesel::update(
            orders::table
                .filter(orders::id.eq(id.get()))
                .filter(orders::status.eq(from.as_str())),
        )
        .set(orders::status.eq(to.as_str()))
        .returning(OrderRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(OrderRepositoryError::from_diesel)?
        else {
            return Ok(None);
        };

        let item_rows = load_lines(&mut conn, order_row.id).await?;
        to_placed_order(order_row, item_rows).map(Some)
    }
}
