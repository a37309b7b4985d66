//! Database operations for `price_alerts`, including the catalog sweep that
//! keeps `current_price` and `triggered` up to date.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use genie_core::Product;

use crate::DbError;

/// A row from the `price_alerts` table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PriceAlertRow {
    pub id: i64,
    pub user_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub platform: String,
    pub target_price: i64,
    pub current_price: i64,
    pub is_active: bool,
    pub triggered: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a price-drop alert.
#[derive(Debug, Clone)]
pub struct NewPriceAlert<'a> {
    pub product_id: &'a str,
    pub product_name: &'a str,
    pub product_image: &'a str,
    pub platform: genie_core::Platform,
    pub target_price: i64,
    /// The watched quote's price at creation time.
    pub current_price: i64,
}

/// Counts from one run of [`sweep_price_alerts`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Alerts whose `current_price` was refreshed from the catalog.
    pub refreshed: u64,
    /// Alerts that crossed their target during this sweep.
    pub newly_triggered: u64,
}

/// Inserts a price alert for a user and returns the new row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_price_alert(
    pool: &PgPool,
    user_id: Uuid,
    alert: &NewPriceAlert<'_>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO price_alerts \
             (user_id, product_id, product_name, product_image, platform, \
              target_price, current_price, triggered) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7 <= $6) \
         RETURNING id",
    )
    .bind(user_id)
    .bind(alert.product_id)
    .bind(alert.product_name)
    .bind(alert.product_image)
    .bind(alert.platform.as_str())
    .bind(alert.target_price)
    .bind(alert.current_price)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns a user's price alerts, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_price_alerts(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<PriceAlertRow>, DbError> {
    let rows = sqlx::query_as::<_, PriceAlertRow>(
        "SELECT id, user_id, product_id, product_name, product_image, platform, \
                target_price, current_price, is_active, triggered, created_at \
         FROM price_alerts \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes one price alert, scoped to its owner.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when the alert does not exist or belongs to
/// a different user, or [`DbError::Sqlx`] if the delete fails.
pub async fn delete_price_alert(pool: &PgPool, id: i64, user_id: Uuid) -> Result<(), DbError> {
    let rows_affected = sqlx::query("DELETE FROM price_alerts WHERE id = $1 AND user_id = $2")
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

/// Refreshes every active alert against the current catalog.
///
/// For each active alert whose watched product/platform quote exists and is
/// in stock, `current_price` is updated to the quote's price and `triggered`
/// is set when `current_price <= target_price`. Alerts whose quote is
/// missing or out of stock keep their last known price.
///
/// Returns counts of refreshed alerts and alerts that newly crossed their
/// target during this sweep. Delivery of the resulting notifications is the
/// caller's concern.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn sweep_price_alerts(
    pool: &PgPool,
    catalog: &[Product],
) -> Result<SweepOutcome, DbError> {
    let by_id: HashMap<&str, &Product> =
        catalog.iter().map(|p| (p.id.as_str(), p)).collect();

    let alerts = sqlx::query_as::<_, PriceAlertRow>(
        "SELECT id, user_id, product_id, product_name, product_image, platform, \
                target_price, current_price, is_active, triggered, created_at \
         FROM price_alerts \
         WHERE is_active = TRUE \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut outcome = SweepOutcome::default();

    for alert in alerts {
        let Ok(platform) = alert.platform.parse::<genie_core::Platform>() else {
            tracing::warn!(alert_id = alert.id, platform = %alert.platform, "alert references unknown platform; skipping");
            continue;
        };

        let Some(quote) = by_id
            .get(alert.product_id.as_str())
            .and_then(|p| p.quote_for(platform))
            .filter(|q| q.in_stock)
        else {
            continue;
        };

        let triggered = quote.price <= alert.target_price;

        sqlx::query("UPDATE price_alerts SET current_price = $1, triggered = $2 WHERE id = $3")
            .bind(quote.price)
            .bind(triggered)
            .bind(alert.id)
            .execute(pool)
            .await?;

        outcome.refreshed += 1;
        if triggered && !alert.triggered {
            outcome.newly_triggered += 1;
        }
    }

    Ok(outcome)
}
