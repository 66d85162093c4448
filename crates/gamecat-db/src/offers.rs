//! Database operations for the `offers` table.

use chrono::{DateTime, Utc};
use gamecat_core::{Offer, Price};
use rust_decimal::Decimal;
use sqlx::PgExecutor;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `offers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferRow {
    pub id: i64,
    pub product_id: i64,
    pub website_name: String,
    pub source_id: String,
    /// `NUMERIC(12,2)`; `NULL` when the storefront listed no price.
    pub price: Option<Decimal>,
    pub price_currency: Option<String>,
    pub url: String,
    pub date_parsed: DateTime<Utc>,
}

impl OfferRow {
    /// A price without a currency is kept with an empty currency code rather
    /// than dropped.
    #[must_use]
    pub fn into_offer(self) -> Offer {
        let price = self.price.map(|amount| Price {
            amount,
            currency: self.price_currency.unwrap_or_default(),
        });
        Offer {
            id: self.id,
            product_id: self.product_id,
            website_name: self.website_name,
            source_id: self.source_id,
            price,
            url: self.url,
            date_parsed: self.date_parsed,
        }
    }
}

/// Number of offers attached to one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct OfferCountRow {
    pub product_id: i64,
    pub offer_count: i64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns all offers attached to `product_id`, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_offers_for_product(
    executor: impl PgExecutor<'_>,
    product_id: i64,
) -> Result<Vec<OfferRow>, DbError> {
    let rows = sqlx::query_as::<_, OfferRow>(
        "SELECT id, product_id, website_name, source_id, price, price_currency, url, date_parsed \
         FROM offers \
         WHERE product_id = $1 \
         ORDER BY id",
    )
    .bind(product_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Returns the offer count for every product that has at least one offer.
///
/// Products without offers are absent; callers treat a missing entry as zero.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_offers_by_product(
    executor: impl PgExecutor<'_>,
) -> Result<Vec<OfferCountRow>, DbError> {
    let rows = sqlx::query_as::<_, OfferCountRow>(
        "SELECT product_id, COUNT(*) AS offer_count \
         FROM offers \
         GROUP BY product_id \
         ORDER BY product_id",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Moves every offer of product `from` onto product `to`.
///
/// `(website_name, source_id)` is unique store-wide, so re-pointing can never
/// create a duplicate listing.
///
/// Returns the number of offers moved.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails (e.g. `to` does not exist).
pub async fn reassign_offers(
    executor: impl PgExecutor<'_>,
    from: i64,
    to: i64,
) -> Result<u64, DbError> {
    let result = sqlx::query("UPDATE offers SET product_id = $1 WHERE product_id = $2")
        .bind(to)
        .bind(from)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
