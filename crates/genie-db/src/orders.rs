//! Database operations for `orders`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `orders` table.
///
/// `items` is the JSONB snapshot of the cart rows the order was placed from;
/// cart rows are deleted on placement, so this is the only surviving record
/// of what was ordered.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub user_id: Uuid,
    pub items: Value,
    pub total: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Places an order from the user's current cart.
///
/// Runs in a single transaction: locks the user's cart rows, snapshots them
/// into the order's `items` JSONB, computes `total = sum(price * quantity)`,
/// inserts the order, and clears the cart. Either everything commits or the
/// cart is left untouched.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when the cart is empty, or
/// [`DbError::Sqlx`] if any statement fails.
pub async fn place_order(pool: &PgPool, user_id: Uuid) -> Result<OrderRow, DbError> {
    let mut tx = pool.begin().await?;

    let items: Vec<crate::CartItemRow> = sqlx::query_as::<_, crate::CartItemRow>(
        "SELECT id, user_id, product_id, product_name, product_image, \
                platform, price, quantity, created_at \
         FROM cart_items \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC \
         FOR UPDATE",
    )
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    if items.is_empty() {
        return Err(DbError::NotFound);
    }

    let total: i64 = items
        .iter()
        .map(|item| item.price * i64::from(item.quantity))
        .sum();
    let items_json = serde_json::to_value(&items)?;

    let order = sqlx::query_as::<_, OrderRow>(
        "INSERT INTO orders (user_id, items, total, status) \
         VALUES ($1, $2, $3, 'completed') \
         RETURNING id, user_id, items, total, status, created_at",
    )
    .bind(user_id)
    .bind(items_json)
    .bind(total)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(order)
}

/// Returns a user's orders, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders(pool: &PgPool, user_id: Uuid) -> Result<Vec<OrderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, user_id, items, total, status, created_at \
         FROM orders \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
