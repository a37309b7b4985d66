//! Database operations for `cart_items`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `cart_items` table.
///
/// `platform` is stored as its lowercase identifier; it is written from a
/// typed [`genie_core::Platform`] via [`NewCartItem`], so values outside the
/// enumeration only appear through direct inserts (seed data, migrations).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItemRow {
    pub id: i64,
    pub user_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub platform: String,
    pub price: i64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when adding a product quote to a cart.
#[derive(Debug, Clone)]
pub struct NewCartItem<'a> {
    pub product_id: &'a str,
    pub product_name: &'a str,
    pub product_image: &'a str,
    pub platform: genie_core::Platform,
    /// Price of the selected quote at add time, in whole currency units.
    pub price: i64,
    pub quantity: i32,
}

/// Inserts a cart item for a user and returns the new row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_cart_item(
    pool: &PgPool,
    user_id: Uuid,
    item: &NewCartItem<'_>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO cart_items \
             (user_id, product_id, product_name, product_image, platform, price, quantity) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING id",
    )
    .bind(user_id)
    .bind(item.product_id)
    .bind(item.product_name)
    .bind(item.product_image)
    .bind(item.platform.as_str())
    .bind(item.price)
    .bind(item.quantity)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns a user's cart items, newest first.
///
/// Ordered by `created_at DESC, id DESC` so insertion order breaks timestamp
/// ties deterministically.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cart_items(pool: &PgPool, user_id: Uuid) -> Result<Vec<CartItemRow>, DbError> {
    let rows = sqlx::query_as::<_, CartItemRow>(
        "SELECT id, user_id, product_id, product_name, product_image, \
                platform, price, quantity, created_at \
         FROM cart_items \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns the number of items in a user's cart.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_cart_items(pool: &PgPool, user_id: Uuid) -> Result<i64, DbError> {
    let count: i64 =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(count)
}

/// Deletes one cart item, scoped to its owner.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when the item does not exist or belongs to a
/// different user, or [`DbError::Sqlx`] if the delete fails.
pub async fn delete_cart_item(pool: &PgPool, id: i64, user_id: Uuid) -> Result<(), DbError> {
    let rows_affected = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Removes every cart item for a user. Returns the number of rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn clear_cart(pool: &PgPool, user_id: Uuid) -> Result<u64, DbError> {
    let rows_affected = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(rows_affected)
}
