//! Embedded PostgreSQL databases with the storefront schema applied.
//!
//! Databases are created on the process-wide shared cluster from
//! `pg-embed-setup-unpriv`, migrated with the embedded Diesel migrations, and
//! seeded through the synchronous `postgres` client so fixtures never run
//! inside a Tokio runtime.

use std::str::FromStr;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::{Client, NoTls};
use rust_decimal::Decimal;

use super::format_postgres_error;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// A temporary database; dropped together with the handle.
pub struct MigratedDatabase {
    database: TemporaryDatabase,
}

/// Aggregates read back from the `customers` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerRow {
    pub total_orders: i32,
    pub total_spent: Decimal,
    pub has_purchase_date: bool,
}

/// Create a fresh database on the shared cluster and run all migrations.
pub fn migrated_database() -> Result<MigratedDatabase, String> {
    let cluster = pg_embedded_setup_unpriv::test_support::shared_cluster_handle()
        .map_err(|err| format!("start shared cluster: {err:?}"))?;
    let database = cluster
        .create_temporary_database()
        .map_err(|err| format!("create database: {err:?}"))?;

    let mut conn = PgConnection::establish(database.url())
        .map_err(|err| format!("connect for migrations: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;

    Ok(MigratedDatabase { database })
}

impl MigratedDatabase {
    /// Connection URL for pools and clients.
    pub fn url(&self) -> &str {
        self.database.url()
    }

    fn client(&self) -> Result<Client, String> {
        Client::connect(self.url(), NoTls).map_err(|err| format_postgres_error(&err))
    }

    /// Insert a customer with zeroed aggregates and return its id.
    pub fn seed_customer(&self, display_name: &str) -> Result<i64, String> {
        let mut client = self.client()?;
        let row = client
            .query_one(
                "INSERT INTO customers (display_name) VALUES ($1) RETURNING id",
                &[&display_name],
            )
            .map_err(|err| format_postgres_error(&err))?;
        Ok(row.get(0))
    }

    /// Insert a product priced from a decimal string such as `"12.50"`.
    pub fn seed_product(&self, name: &str, price: &str, stock: i32) -> Result<i64, String> {
        let mut client = self.client()?;
        let row = client
            .query_one(
                concat!(
                    "INSERT INTO products (name, price, stock_quantity) ",
                    "VALUES ($1, $2::text::numeric, $3) RETURNING id"
                ),
                &[&name, &price, &stock],
            )
            .map_err(|err| format_postgres_error(&err))?;
        Ok(row.get(0))
    }

    /// Current stock for a product.
    pub fn stock_of(&self, product_id: i64) -> Result<i32, String> {
        let mut client = self.client()?;
        let row = client
            .query_one(
                "SELECT stock_quantity FROM products WHERE id = $1",
                &[&product_id],
            )
            .map_err(|err| format_postgres_error(&err))?;
        Ok(row.get(0))
    }

    /// Current aggregates for a customer.
    pub fn customer(&self, customer_id: i64) -> Result<CustomerRow, String> {
        let mut client = self.client()?;
        let row = client
            .query_one(
                concat!(
                    "SELECT total_orders, total_spent::text, last_purchase_date IS NOT NULL ",
                    "FROM customers WHERE id = $1"
                ),
                &[&customer_id],
            )
            .map_err(|err| format_postgres_error(&err))?;
        let total_spent: String = row.get(1);
        Ok(CustomerRow {
            total_orders: row.get(0),
            total_spent: Decimal::from_str(&total_spent).map_err(|err| err.to_string())?,
            has_purchase_date: row.get(2),
        })
    }

    /// Number of rows in `orders` and `order_items`.
    pub fn order_row_counts(&self) -> Result<(i64, i64), String> {
        let mut client = self.client()?;
        let row = client
            .query_one(
                "SELECT (SELECT count(*) FROM orders), (SELECT count(*) FROM order_items)",
                &[],
            )
            .map_err(|err| format_postgres_error(&err))?;
        Ok((row.get(0), row.get(1)))
    }
}
