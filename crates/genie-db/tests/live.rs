//! Live integration tests for genie-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/genie-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use uuid::Uuid;

use genie_core::{Platform, PriceQuote, Product};
use genie_db::{
    clear_cart, count_cart_items, delete_cart_item, insert_cart_item, insert_price_alert,
    list_cart_items, list_price_alerts, place_order, sweep_price_alerts, DbError, NewCartItem,
    NewPriceAlert,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_quote(platform: Platform, price: i64, in_stock: bool) -> PriceQuote {
    PriceQuote {
        platform,
        price,
        url: format!("https://{platform}.example.com"),
        in_stock,
    }
}

fn make_product(id: &str, quotes: Vec<PriceQuote>) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Test Product {id}"),
        image_url: format!("https://images.example.com/{id}.jpg"),
        category: "Electronics".to_string(),
        quotes,
    }
}

fn make_cart_item<'a>(product: &'a Product, platform: Platform, quantity: i32) -> NewCartItem<'a> {
    let quote = product.quote_for(platform).expect("quote");
    NewCartItem {
        product_id: &product.id,
        product_name: &product.name,
        product_image: &product.image_url,
        platform,
        price: quote.price,
        quantity,
    }
}

// ---------------------------------------------------------------------------
// Cart items
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn cart_insert_list_and_count(pool: sqlx::PgPool) {
    let user = Uuid::new_v4();
    let product = make_product("p-1", vec![make_quote(Platform::Amazon, 1_299, true)]);

    let id = insert_cart_item(&pool, user, &make_cart_item(&product, Platform::Amazon, 2))
        .await
        .expect("insert");
    assert!(id > 0);

    let items = list_cart_items(&pool, user).await.expect("list");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, "p-1");
    assert_eq!(items[0].platform, "amazon");
    assert_eq!(items[0].price, 1_299);
    assert_eq!(items[0].quantity, 2);

    assert_eq!(count_cart_items(&pool, user).await.expect("count"), 1);
    // Another user's cart is untouched.
    assert_eq!(
        count_cart_items(&pool, Uuid::new_v4()).await.expect("count"),
        0
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn cart_delete_requires_the_owner(pool: sqlx::PgPool) {
    let owner = Uuid::new_v4();
    let product = make_product("p-1", vec![make_quote(Platform::Flipkart, 500, true)]);

    let id = insert_cart_item(&pool, owner, &make_cart_item(&product, Platform::Flipkart, 1))
        .await
        .expect("insert");

    let err = delete_cart_item(&pool, id, Uuid::new_v4())
        .await
        .expect_err("foreign delete must fail");
    assert!(matches!(err, DbError::NotFound));

    delete_cart_item(&pool, id, owner).await.expect("delete");
    assert_eq!(count_cart_items(&pool, owner).await.expect("count"), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn clear_cart_reports_rows_deleted(pool: sqlx::PgPool) {
    let user = Uuid::new_v4();
    let product = make_product(
        "p-1",
        vec![
            make_quote(Platform::Amazon, 100, true),
            make_quote(Platform::Myntra, 90, true),
        ],
    );

    for platform in [Platform::Amazon, Platform::Myntra] {
        insert_cart_item(&pool, user, &make_cart_item(&product, platform, 1))
            .await
            .expect("insert");
    }

    assert_eq!(clear_cart(&pool, user).await.expect("clear"), 2);
    assert_eq!(clear_cart(&pool, user).await.expect("clear again"), 0);
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn place_order_snapshots_totals_and_clears(pool: sqlx::PgPool) {
    let user = Uuid::new_v4();
    let product = make_product(
        "p-1",
        vec![
            make_quote(Platform::Amazon, 1_000, true),
            make_quote(Platform::Tira, 800, true),
        ],
    );

    insert_cart_item(&pool, user, &make_cart_item(&product, Platform::Amazon, 2))
        .await
        .expect("insert");
    insert_cart_item(&pool, user, &make_cart_item(&product, Platform::Tira, 1))
        .await
        .expect("insert");

    let order = place_order(&pool, user).await.expect("place order");
    assert_eq!(order.total, 2 * 1_000 + 800);
    assert_eq!(order.status, "completed");
    assert_eq!(order.items.as_array().map(Vec::len), Some(2));

    assert_eq!(count_cart_items(&pool, user).await.expect("count"), 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn place_order_on_an_empty_cart_is_not_found(pool: sqlx::PgPool) {
    let err = place_order(&pool, Uuid::new_v4())
        .await
        .expect_err("empty cart");
    assert!(matches!(err, DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Price alerts
// ---------------------------------------------------------------------------

async fn insert_alert(
    pool: &sqlx::PgPool,
    user: Uuid,
    product: &Product,
    platform: Platform,
    target_price: i64,
) -> i64 {
    let quote = product.quote_for(platform).expect("quote");
    insert_price_alert(
        pool,
        user,
        &NewPriceAlert {
            product_id: &product.id,
            product_name: &product.name,
            product_image: &product.image_url,
            platform,
            target_price,
            current_price: quote.price,
        },
    )
    .await
    .expect("insert alert")
}

#[sqlx::test(migrations = "../../migrations")]
async fn sweep_refreshes_prices_and_triggers_once(pool: sqlx::PgPool) {
    let user = Uuid::new_v4();
    let product = make_product("p-1", vec![make_quote(Platform::Amazon, 29_990, true)]);
    insert_alert(&pool, user, &product, Platform::Amazon, 25_000).await;

    let alerts = list_price_alerts(&pool, user).await.expect("list");
    assert_eq!(alerts[0].current_price, 29_990);
    assert!(!alerts[0].triggered);

    // Price drops below the target.
    let dropped = vec![make_product(
        "p-1",
        vec![make_quote(Platform::Amazon, 24_000, true)],
    )];
    let outcome = sweep_price_alerts(&pool, &dropped).await.expect("sweep");
    assert_eq!(outcome.refreshed, 1);
    assert_eq!(outcome.newly_triggered, 1);

    let alerts = list_price_alerts(&pool, user).await.expect("list");
    assert_eq!(alerts[0].current_price, 24_000);
    assert!(alerts[0].triggered);

    // A second sweep at the same price refreshes but triggers nothing new.
    let outcome = sweep_price_alerts(&pool, &dropped).await.expect("sweep");
    assert_eq!(outcome.refreshed, 1);
    assert_eq!(outcome.newly_triggered, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn sweep_skips_missing_and_out_of_stock_quotes(pool: sqlx::PgPool) {
    let user = Uuid::new_v4();
    let product = make_product("p-1", vec![make_quote(Platform::Amazon, 1_000, true)]);
    insert_alert(&pool, user, &product, Platform::Amazon, 500).await;

    // Product vanished from the catalog.
    let outcome = sweep_price_alerts(&pool, &[]).await.expect("sweep");
    assert_eq!(outcome.refreshed, 0);

    // Quote exists but is out of stock; last known price is kept.
    let out_of_stock = vec![make_product(
        "p-1",
        vec![make_quote(Platform::Amazon, 400, false)],
    )];
    let outcome = sweep_price_alerts(&pool, &out_of_stock)
        .await
        .expect("sweep");
    assert_eq!(outcome.refreshed, 0);

    let alerts = list_price_alerts(&pool, user).await.expect("list");
    assert_eq!(alerts[0].current_price, 1_000);
    assert!(!alerts[0].triggered);
}

#[sqlx::test(migrations = "../../migrations")]
async fn alert_at_or_below_target_is_created_triggered(pool: sqlx::PgPool) {
    let user = Uuid::new_v4();
    let product = make_product("p-1", vec![make_quote(Platform::Myntra, 450, true)]);
    insert_alert(&pool, user, &product, Platform::Myntra, 500).await;

    let alerts = list_price_alerts(&pool, user).await.expect("list");
    assert!(alerts[0].triggered);
}
