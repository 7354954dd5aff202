//! Tests for the cart service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{MockCartCache, MockProductRepository};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

fn product(id: i64, cents: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        price: Decimal::new(cents, 2),
        stock_quantity: stock,
        image_ref: None,
    }
}

#[fixture]
fn identity() -> CartIdentity {
    CartIdentity::User(CustomerId::new(7))
}

fn session_id() -> SessionId {
    SessionId::new("anon-42").expect("valid session id")
}

fn encode(cart: &Cart) -> String {
    serde_json::to_string(cart).expect("encode cart")
}

/// Cache mock serving fixed documents by key.
fn cache_with(documents: HashMap<String, String>) -> MockCartCache {
    let mut cache = MockCartCache::new();
    cache
        .expect_get()
        .returning(move |key| Ok(documents.get(key.as_str()).cloned()));
    cache
}

fn catalogue_with(products: Vec<Product>) -> MockProductRepository {
    let mut repo = MockProductRepository::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(products.iter().find(|product| product.id == id).cloned()));
    repo
}

fn make_service(
    cache: MockCartCache,
    repo: MockProductRepository,
) -> CartService<MockCartCache, MockProductRepository> {
    CartService::new(Arc::new(cache), Arc::new(repo), CartConfig::default())
}

#[rstest]
#[tokio::test]
async fn add_over_stock_fails_without_cache_write(identity: CartIdentity) {
    let mut cache = cache_with(HashMap::new());
    cache.expect_set_with_ttl().times(0);
    let service = make_service(cache, catalogue_with(vec![product(1, 5000, 2)]));

    let err = service
        .add_item(&identity, ProductId::new(1), 3)
        .await
        .expect_err("over stock");

    assert_eq!(err.code(), ErrorCode::InsufficientStock);
    let details = err.details().expect("stock details");
    assert_eq!(details["available"], 2);
    assert_eq!(details["requested"], 3);
}

#[rstest]
#[tokio::test]
async fn add_checks_cumulative_quantity(identity: CartIdentity) {
    let scarf = product(2, 3000, 4);
    let existing = Cart::empty().with_product_added(&scarf, 3);
    let mut cache = cache_with(HashMap::from([(
        "cart:user:7".to_owned(),
        encode(&existing),
    )]));
    cache.expect_set_with_ttl().times(0);
    let service = make_service(cache, catalogue_with(vec![scarf]));

    let err = service
        .add_item(&identity, ProductId::new(2), 2)
        .await
        .expect_err("3 + 2 exceeds 4");

    assert_eq!(err.code(), ErrorCode::InsufficientStock);
    assert_eq!(err.details().expect("details")["requested"], 5);
}

#[rstest]
#[tokio::test]
async fn add_new_product_snapshots_and_saves(identity: CartIdentity) {
    let written = Arc::new(Mutex::new(None::<String>));
    let sink = Arc::clone(&written);
    let mut cache = cache_with(HashMap::new());
    cache
        .expect_set_with_ttl()
        .withf(|key, _, _| key.as_str() == "cart:user:7")
        .times(1)
        .returning(move |_, _, value| {
            *sink.lock().expect("sink lock") = Some(value.to_owned());
            Ok(())
        });
    let service = make_service(cache, catalogue_with(vec![product(1, 5000, 5)]));

    let cart = service
        .add_item(&identity, ProductId::new(1), 2)
        .await
        .expect("add succeeds");

    assert_eq!(cart.total(), Decimal::new(10000, 2));
    assert_eq!(cart.line_count(), 2);
    let stored = written.lock().expect("sink lock").clone().expect("document written");
    let decoded: Cart = serde_json::from_str(&stored).expect("stored cart decodes");
    assert_eq!(decoded, cart);
}

#[rstest]
#[tokio::test]
async fn add_unknown_product_is_not_found(identity: CartIdentity) {
    let mut cache = MockCartCache::new();
    cache.expect_set_with_ttl().times(0);
    let service = make_service(cache, catalogue_with(Vec::new()));

    let err = service
        .add_item(&identity, ProductId::new(99), 1)
        .await
        .expect_err("unknown product");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn add_zero_quantity_is_invalid(identity: CartIdentity) {
    let service = make_service(MockCartCache::new(), MockProductRepository::new());

    let err = service
        .add_item(&identity, ProductId::new(1), 0)
        .await
        .expect_err("zero quantity");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn update_absent_line_is_not_found(identity: CartIdentity) {
    let mut cache = cache_with(HashMap::new());
    cache.expect_set_with_ttl().times(0);
    let service = make_service(cache, catalogue_with(vec![product(1, 5000, 5)]));

    let err = service
        .update_item(&identity, ProductId::new(1), 2)
        .await
        .expect_err("line absent");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_to_zero_removes_without_stock_lookup(identity: CartIdentity) {
    let mug = product(1, 1250, 10);
    let existing = Cart::empty().with_product_added(&mug, 2);
    let mut cache = cache_with(HashMap::from([(
        "cart:user:7".to_owned(),
        encode(&existing),
    )]));
    cache
        .expect_set_with_ttl()
        .times(1)
        .returning(|_, _, _| Ok(()));
    let mut repo = MockProductRepository::new();
    repo.expect_find_by_id().times(0);
    let service = make_service(cache, repo);

    let cart = service
        .update_item(&identity, mug.id, 0)
        .await
        .expect("update succeeds");

    assert!(cart.is_empty());
}

#[rstest]
#[tokio::test]
async fn update_over_stock_fails_without_cache_write(identity: CartIdentity) {
    let mug = product(1, 1250, 3);
    let existing = Cart::empty().with_product_added(&mug, 1);
    let mut cache = cache_with(HashMap::from([(
        "cart:user:7".to_owned(),
        encode(&existing),
    )]));
    cache.expect_set_with_ttl().times(0);
    let service = make_service(cache, catalogue_with(vec![mug.clone()]));

    let err = service
        .update_item(&identity, mug.id, 4)
        .await
        .expect_err("over stock");

    assert_eq!(err.code(), ErrorCode::InsufficientStock);
}

#[rstest]
#[tokio::test]
async fn remove_absent_line_is_not_found(identity: CartIdentity) {
    let mut cache = cache_with(HashMap::new());
    cache.expect_set_with_ttl().times(0);
    let service = make_service(cache, MockProductRepository::new());

    let err = service
        .remove_item(&identity, ProductId::new(5))
        .await
        .expect_err("line absent");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn clear_deletes_the_key(identity: CartIdentity) {
    let mut cache = MockCartCache::new();
    cache
        .expect_delete()
        .withf(|key| key.as_str() == "cart:user:7")
        .times(1)
        .returning(|_| Ok(()));
    let service = make_service(cache, MockProductRepository::new());

    service.clear(&identity).await.expect("clear succeeds");
}

#[tokio::test]
async fn merge_with_empty_session_cart_makes_no_writes() {
    let mug = product(1, 1250, 10);
    let user_cart = Cart::empty().with_product_added(&mug, 2);
    let mut cache = cache_with(HashMap::from([(
        "cart:user:7".to_owned(),
        encode(&user_cart),
    )]));
    cache.expect_set_with_ttl().times(0);
    cache.expect_delete().times(0);
    let service = make_service(cache, MockProductRepository::new());

    let merged = service
        .merge(CustomerId::new(7), &session_id())
        .await
        .expect("merge succeeds");

    assert_eq!(merged, user_cart);
}

#[tokio::test]
async fn merge_sums_quantities_and_deletes_session_cart() {
    let a = product(1, 1000, 1);
    let b = product(2, 500, 10);
    let user_cart = Cart::empty()
        .with_product_added(&a, 2)
        .with_product_added(&b, 1);
    let session_cart = Cart::empty().with_product_added(&a, 1);
    let mut cache = cache_with(HashMap::from([
        ("cart:user:7".to_owned(), encode(&user_cart)),
        ("cart:session:anon-42".to_owned(), encode(&session_cart)),
    ]));
    cache
        .expect_set_with_ttl()
        .withf(|key, _, _| key.as_str() == "cart:user:7")
        .times(1)
        .returning(|_, _, _| Ok(()));
    cache
        .expect_delete()
        .withf(|key| key.as_str() == "cart:session:anon-42")
        .times(1)
        .returning(|_| Ok(()));
    let mut repo = MockProductRepository::new();
    repo.expect_find_by_id().times(0);
    let service = make_service(cache, repo);

    let merged = service
        .merge(CustomerId::new(7), &session_id())
        .await
        .expect("merge succeeds");

    assert_eq!(merged.quantity_of(a.id), 3, "merge ignores stock of 1");
    assert_eq!(merged.quantity_of(b.id), 1);
    assert_eq!(merged.line_count(), 4);
    assert_eq!(merged.total(), Decimal::new(3500, 2));
}

#[rstest]
#[tokio::test]
async fn product_repository_outage_is_unavailable(identity: CartIdentity) {
    let mut repo = MockProductRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .returning(|_| Err(ProductRepositoryError::connection("pool timed out")));
    let service = make_service(MockCartCache::new(), repo);

    let err = service
        .add_item(&identity, ProductId::new(1), 1)
        .await
        .expect_err("repository down");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
