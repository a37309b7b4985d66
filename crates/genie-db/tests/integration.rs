//! Offline unit tests for genie-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use genie_core::{AppConfig, Environment};
use genie_db::{CartItemRow, PoolConfig};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        catalog_path: PathBuf::from("./config/catalog.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        alert_sweep_schedule: "0 0 * * * *".to_string(),
        cart_feed_capacity: 64,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`CartItemRow`] serializes with the
/// field names the order snapshot depends on. No database required.
#[test]
fn cart_item_row_serializes_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = CartItemRow {
        id: 1_i64,
        user_id: Uuid::new_v4(),
        product_id: "p-1".to_string(),
        product_name: "Test Product".to_string(),
        product_image: "https://images.example.com/p-1.jpg".to_string(),
        platform: "amazon".to_string(),
        price: 1_299,
        quantity: 2,
        created_at: Utc::now(),
    };

    let json = serde_json::to_value(&row).expect("serialize");
    assert_eq!(json["product_id"], "p-1");
    assert_eq!(json["platform"], "amazon");
    assert_eq!(json["price"], 1_299);
    assert_eq!(json["quantity"], 2);
}
