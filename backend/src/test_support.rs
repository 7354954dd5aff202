//! In-memory adapters for tests.
//!
//! Compiled for unit tests and, through the `test-support` feature, for the
//! integration tests in `tests/`. The stores mirror the semantics of the
//! Redis and PostgreSQL adapters closely enough to exercise the domain
//! services end to end: the cache counts writes so tests can assert that a
//! rejected mutation never touched it, and the commerce store applies an
//! order commit atomically under one lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::ports::{
    CartCache, CartCacheError, OrderRepository, OrderRepositoryError, ProductRepository,
    ProductRepositoryError,
};
use crate::domain::{
    CartKey, CustomerId, Order, OrderId, OrderLine, OrderStatus, OrderUnitOfWork, PlacedOrder,
    Product, ProductId,
};

#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    ttl: Duration,
}

/// Cart cache backed by a hash map. Entries never expire on their own.
#[derive(Debug, Default)]
pub struct InMemoryCartCache {
    entries: Mutex<HashMap<String, CachedValue>>,
    writes: AtomicUsize,
}

impl InMemoryCartCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, CachedValue>>, CartCacheError> {
        self.entries
            .lock()
            .map_err(|_| CartCacheError::backend("in-memory cache lock poisoned"))
    }

    /// Number of `set_with_ttl` and `delete` calls made so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw value stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).map(|entry| entry.value.clone()))
    }

    /// TTL applied by the most recent write to `key`.
    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).map(|entry| entry.ttl))
    }

    /// Whether anything is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    /// Store a raw value without counting it as a write, e.g. a corrupt
    /// document.
    pub fn seed_raw(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_owned(),
                CachedValue {
                    value: value.to_owned(),
                    ttl: Duration::ZERO,
                },
            );
        }
    }
}

#[async_trait]
impl CartCache for InMemoryCartCache {
    async fn get(&self, key: &CartKey) -> Result<Option<String>, CartCacheError> {
        Ok(self
            .entries()?
            .get(key.as_str())
            .map(|entry| entry.value.clone()))
    }

    async fn set_with_ttl(
        &self,
        key: &CartKey,
        ttl: Duration,
        value: &str,
    ) -> Result<(), CartCacheError> {
        self.entries()?.insert(
            key.as_str().to_owned(),
            CachedValue {
                value: value.to_owned(),
                ttl,
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, key: &CartKey) -> Result<(), CartCacheError> {
        self.entries()?.remove(key.as_str());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Aggregates the checkout transaction maintains per customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerStats {
    pub total_orders: u32,
    pub total_spent: Decimal,
    pub last_purchase_date: Option<DateTime<Utc>>,
}

impl Default for CustomerStats {
    fn default() -> Self {
        Self {
            total_orders: 0,
            total_spent: Decimal::ZERO,
            last_purchase_date: None,
        }
    }
}

#[derive(Debug, Default)]
struct CommerceState {
    products: BTreeMap<ProductId, Product>,
    customers: HashMap<CustomerId, CustomerStats>,
    orders: BTreeMap<OrderId, PlacedOrder>,
    next_order_id: i64,
}

impl CommerceState {
    /// Check every write a commit would make, without applying any.
    fn validate(&self, work: &OrderUnitOfWork) -> Result<(), OrderRepositoryError> {
        for (product_id, quantity) in work.stock_decrements() {
            let product = self
                .products
                .get(&product_id)
                .ok_or_else(|| OrderRepositoryError::product_missing(product_id.get()))?;
            if product.stock_quantity < quantity {
                return Err(OrderRepositoryError::insufficient_stock(
                    product_id.get(),
                    product.stock_quantity,
                    quantity,
                ));
            }
        }
        if !self.customers.contains_key(&work.customer_id()) {
            return Err(OrderRepositoryError::customer_missing(
                work.customer_id().get(),
            ));
        }
        Ok(())
    }

    fn apply(&mut self, work: &OrderUnitOfWork) -> PlacedOrder {
        for (product_id, quantity) in work.stock_decrements() {
            if let Some(product) = self.products.get_mut(&product_id) {
                product.stock_quantity -= quantity;
            }
        }
        if let Some(stats) = self.customers.get_mut(&work.customer_id()) {
            stats.total_orders += 1;
            stats.total_spent += work.total();
            stats.last_purchase_date = Some(work.order_date());
        }

        self.next_order_id += 1;
        let id = OrderId::new(self.next_order_id);
        let placed = PlacedOrder {
            order: Order {
                id,
                customer_id: work.customer_id(),
                order_date: work.order_date(),
                status: OrderStatus::Pending,
                total: work.total(),
            },
            lines: work
                .lines()
                .iter()
                .map(|line| OrderLine {
                    order_id: id,
                    product_id: line.product_id,
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
        };
        self.orders.insert(id, placed.clone());
        placed
    }
}

/// Product and order store behind one mutex.
///
/// A commit validates every stock decrement and the customer before applying
/// anything, so a failed commit leaves no trace, matching the transactional
/// adapter.
#[derive(Debug, Default)]
pub struct InMemoryCommerceStore {
    state: Mutex<CommerceState>,
}

impl InMemoryCommerceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, CommerceState>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }

    /// Add or replace a product.
    pub fn put_product(&self, product: Product) {
        if let Ok(mut state) = self.state.lock() {
            state.products.insert(product.id, product);
        }
    }

    /// Register a customer with zeroed aggregates.
    pub fn add_customer(&self, customer_id: CustomerId) {
        if let Ok(mut state) = self.state.lock() {
            state.customers.entry(customer_id).or_default();
        }
    }

    /// Current product record.
    pub fn product(&self, product_id: ProductId) -> Option<Product> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.products.get(&product_id).cloned())
    }

    /// Current customer aggregates.
    pub fn customer(&self, customer_id: CustomerId) -> Option<CustomerStats> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.customers.get(&customer_id).cloned())
    }

    /// Number of stored orders.
    pub fn order_count(&self) -> usize {
        self.state.lock().map_or(0, |state| state.orders.len())
    }
}

#[async_trait]
impl ProductRepository for InMemoryCommerceStore {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, ProductRepositoryError> {
        let state = self.state().map_err(ProductRepositoryError::connection)?;
        Ok(state.products.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, ProductRepositoryError> {
        let state = self.state().map_err(ProductRepositoryError::connection)?;
        Ok(state
            .products
            .values()
            .filter(|product| ids.contains(&product.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderRepository for InMemoryCommerceStore {
    async fn commit(&self, work: OrderUnitOfWork) -> Result<PlacedOrder, OrderRepositoryError> {
        let mut state = self.state().map_err(OrderRepositoryError::connection)?;
        state.validate(&work)?;
        Ok(state.apply(&work))
    }

    async fn find_order(&self, id: OrderId) -> Result<Option<PlacedOrder>, OrderRepositoryError> {
        let state = self.state().map_err(OrderRepositoryError::connection)?;
        Ok(state.orders.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<PlacedOrder>, OrderRepositoryError> {
        let mut state = self.state().map_err(OrderRepositoryError::connection)?;
        let Some(placed) = state.orders.get_mut(&id) else {
            return Ok(None);
        };
        if placed.order.status != from {
            return Ok(None);
        }
        placed.order.status = to;
        Ok(Some(placed.clone()))
    }
}
