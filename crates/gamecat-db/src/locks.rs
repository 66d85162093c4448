//! Transaction-scoped controls: isolation level and advisory locks.

use sqlx::PgExecutor;

use crate::DbError;

/// Switch the current transaction to `REPEATABLE READ`.
///
/// Must run before the transaction's first query, so every later read sees
/// the same snapshot.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query already ran in this transaction or
/// the statement fails.
pub async fn set_repeatable_read(executor: impl PgExecutor<'_>) -> Result<(), DbError> {
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(executor)
        .await?;
    Ok(())
}

/// Try to take a transaction-scoped advisory lock on `key`.
///
/// Returns `false` immediately if another session holds it. The lock is
/// released when the surrounding transaction commits or rolls back, so it
/// must be taken on the transaction's own connection.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn try_advisory_xact_lock(executor: impl PgExecutor<'_>, key: i64) -> Result<bool, DbError> {
    let acquired = sqlx::query_scalar::<_, bool>("SELECT pg_try_advisory_xact_lock($1)")
        .bind(key)
        .fetch_one(executor)
        .await?;

    Ok(acquired)
}
