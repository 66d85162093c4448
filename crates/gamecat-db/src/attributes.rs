//! Database operations for the `attributes` table.

use gamecat_core::{Attribute, AttributeName};
use sqlx::PgExecutor;

use crate::DbError;

/// A single `platform` attribute value as stored, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PlatformValueRow {
    pub product_id: i64,
    pub attribute_value: String,
}

/// A row from the `attributes` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AttributeRow {
    pub id: i64,
    pub product_id: i64,
    pub attribute_name: String,
    pub attribute_value: String,
}

impl AttributeRow {
    #[must_use]
    pub fn into_attribute(self) -> Attribute {
        Attribute::new(self.product_id, self.attribute_name, self.attribute_value)
    }
}

/// Returns all attributes owned by `product_id`, ordered by name then value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_attributes_for_product(
    executor: impl PgExecutor<'_>,
    product_id: i64,
) -> Result<Vec<AttributeRow>, DbError> {
    let rows = sqlx::query_as::<_, AttributeRow>(
        "SELECT id, product_id, attribute_name, attribute_value \
         FROM attributes \
         WHERE product_id = $1 \
         ORDER BY attribute_name, attribute_value, id",
    )
    .bind(product_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Returns every `platform` attribute value, ordered by product id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_platform_values(
    executor: impl PgExecutor<'_>,
) -> Result<Vec<PlatformValueRow>, DbError> {
    let rows = sqlx::query_as::<_, PlatformValueRow>(
        "SELECT product_id, attribute_value \
         FROM attributes \
         WHERE attribute_name = $1 \
         ORDER BY product_id, attribute_value",
    )
    .bind(AttributeName::Platform.as_str())
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

/// Copies every attribute of product `from` onto product `to`, skipping any
/// `(attribute_name, attribute_value)` pair `to` already has.
///
/// `DISTINCT` keeps a loser that carries the same pair twice from producing
/// two copies on the survivor.
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn copy_attributes_skip_duplicates(
    executor: impl PgExecutor<'_>,
    from: i64,
    to: i64,
) -> Result<u64, DbError> {
    let result = sqlx::query(
        "INSERT INTO attributes (product_id, attribute_name, attribute_value) \
         SELECT DISTINCT $1::bigint, src.attribute_name, src.attribute_value \
         FROM attributes src \
         WHERE src.product_id = $2 \
           AND NOT EXISTS ( \
               SELECT 1 FROM attributes dst \
               WHERE dst.product_id = $1 \
                 AND dst.attribute_name = src.attribute_name \
                 AND dst.attribute_value = src.attribute_value \
           )",
    )
    .bind(to)
    .bind(from)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Deletes every attribute row owned by `product_id`.
///
/// Returns the number of rows deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_attributes(
    executor: impl PgExecutor<'_>,
    product_id: i64,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM attributes WHERE product_id = $1")
        .bind(product_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
