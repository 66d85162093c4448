//! Postgres-backed store and the batch driver that owns its transaction.

use std::collections::HashMap;

use async_trait::async_trait;
use gamecat_core::ProductRecord;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{DedupEngine, DedupError, DedupReport, DedupStore, RunMode, StoreError};

/// Advisory lock key held for the lifetime of a pass transaction.
pub const DEDUP_LOCK_KEY: i64 = 0x6761_6d65_6361_7401;

/// A [`DedupStore`] over one open Postgres transaction.
pub struct PgDedupStore {
    tx: Transaction<'static, Postgres>,
}

impl PgDedupStore {
    /// Open a `REPEATABLE READ` transaction, so the snapshot reads and the
    /// merge writes of one pass see the same catalog.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Db`] if no connection can be acquired or the
    /// isolation level cannot be set.
    pub async fn begin(pool: &PgPool) -> Result<Self, StoreError> {
        let mut tx = pool.begin().await?;
        gamecat_db::set_repeatable_read(&mut *tx).await?;
        Ok(Self { tx })
    }

    /// Take the pass lock for the rest of this transaction. `false` means
    /// another pass already holds it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Db`] if the lock query fails.
    pub async fn try_lock(&mut self) -> Result<bool, StoreError> {
        Ok(gamecat_db::try_advisory_xact_lock(&mut *self.tx, DEDUP_LOCK_KEY).await?)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Db`] if the commit fails.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Db`] if the rollback fails.
    pub async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl DedupStore for PgDedupStore {
    async fn load_products(&mut self) -> Result<Vec<ProductRecord>, StoreError> {
        let rows = gamecat_db::list_products_for_dedup(&mut *self.tx).await?;
        Ok(rows.into_iter().map(gamecat_db::ProductRow::into_record).collect())
    }

    async fn load_platform_values(&mut self) -> Result<Vec<(i64, String)>, StoreError> {
        let rows = gamecat_db::list_platform_values(&mut *self.tx).await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.product_id, r.attribute_value))
            .collect())
    }

    async fn load_offer_counts(&mut self) -> Result<HashMap<i64, i64>, StoreError> {
        let rows = gamecat_db::count_offers_by_product(&mut *self.tx).await?;
        Ok(rows
            .into_iter()
            .map(|r| (r.product_id, r.offer_count))
            .collect())
    }

    async fn reassign_offers(&mut self, from: i64, to: i64) -> Result<u64, StoreError> {
        Ok(gamecat_db::reassign_offers(&mut *self.tx, from, to).await?)
    }

    async fn copy_attributes_skip_duplicates(
        &mut self,
        from: i64,
        to: i64,
    ) -> Result<u64, StoreError> {
        Ok(gamecat_db::copy_attributes_skip_duplicates(&mut *self.tx, from, to).await?)
    }

    async fn delete_attributes(&mut self, product_id: i64) -> Result<u64, StoreError> {
        Ok(gamecat_db::delete_attributes(&mut *self.tx, product_id).await?)
    }

    async fn delete_product(&mut self, product_id: i64) -> Result<(), StoreError> {
        gamecat_db::delete_product(&mut *self.tx, product_id).await?;
        Ok(())
    }
}

/// Run one pass inside a single transaction.
///
/// The transaction is committed only when `mode` writes and every merge
/// succeeded; otherwise it is rolled back and the catalog is untouched.
///
/// # Errors
///
/// Returns [`DedupError::RunInProgress`] if another pass holds the lock, or
/// the first read/write failure of the pass.
pub async fn run_dedup_pass(
    pool: &PgPool,
    engine: &DedupEngine,
    mode: RunMode,
) -> Result<DedupReport, DedupError> {
    let mut store = PgDedupStore::begin(pool).await?;

    if !store.try_lock().await? {
        store.rollback().await?;
        return Err(DedupError::RunInProgress);
    }

    let report = match engine.run(&mut store, mode).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(error = %e, "dedup pass failed; rolling back");
            if let Err(rollback_err) = store.rollback().await {
                tracing::error!(error = %rollback_err, "rollback after failed pass also failed");
            }
            return Err(e);
        }
    };

    if mode.writes() {
        store.commit().await?;
    } else {
        store.rollback().await?;
    }
    Ok(report)
}
