//! Database operations for the `products` table.

use gamecat_core::{ProductRecord, ReleaseYear};
use sqlx::PgExecutor;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// The slice of a `products` row the deduplication pass needs.
///
/// `release_year` is selected as text and parsed in Rust so that a stray
/// non-numeric value degrades to an unknown year instead of failing the read.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub canonical_name: String,
    pub release_year: Option<String>,
}

impl ProductRow {
    #[must_use]
    pub fn into_record(self) -> ProductRecord {
        let release_year = ReleaseYear::parse_lenient(self.release_year.as_deref());
        ProductRecord {
            id: self.id,
            canonical_name: self.canonical_name,
            release_year,
        }
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every product with its id, title, and stored release year,
/// ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_for_dedup(
    executor: impl PgExecutor<'_>,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, COALESCE(canonical_name, '') AS canonical_name, \
                release_year::text AS release_year \
         FROM products \
         ORDER BY id",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Deletes a single product row.
///
/// Callers must have re-pointed its offers and removed its attributes first;
/// otherwise the foreign keys reject the delete.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row with `id` exists, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_product(executor: impl PgExecutor<'_>, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
