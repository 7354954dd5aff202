//! Diesel table definitions for the storefront schema.
//!
//! Must match `migrations/` exactly. Regenerate with `diesel print-schema`
//! after changing a migration.

diesel::table! {
    /// Customer accounts and the aggregates maintained by checkout.
    customers (id) {
        id -> Int8,
        display_name -> Varchar,
        /// Incremented by one per placed order.
        total_orders -> Int4,
        /// Running sum of order totals.
        total_spent -> Numeric,
        last_purchase_date -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogue products; authoritative price and stock.
    products (id) {
        id -> Int8,
        name -> Varchar,
        price -> Numeric,
        /// Never negative (CHECK constraint).
        stock_quantity -> Int4,
        image_ref -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Order headers.
    orders (id) {
        id -> Int8,
        customer_id -> Int8,
        order_date -> Timestamptz,
        /// One of the lowercase `OrderStatus` names.
        status -> Varchar,
        total -> Numeric,
    }
}

diesel::table! {
    /// Charged lines of each order.
    order_items (id) {
        id -> Int8,
        order_id -> Int8,
        product_id -> Int8,
        quantity -> Int4,
        unit_price -> Numeric,
    }
}

diesel::joinable!(orders -> customers (customer_id));
diesel::joinable!(order_items -> orders (order_id));
diesel::joinable!(order_items -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(customers, order_items, orders, products);
