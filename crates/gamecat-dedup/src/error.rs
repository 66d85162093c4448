use thiserror::Error;

/// Failures raised by a [`DedupStore`](crate::DedupStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] gamecat_db::DbError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
}

/// Failures of a deduplication pass. Every variant aborts the whole run.
#[derive(Debug, Error)]
pub enum DedupError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("another deduplication run holds the lock")]
    RunInProgress,
    #[error("cannot select a survivor from an empty cluster")]
    EmptyCluster,
}

impl From<gamecat_db::DbError> for DedupError {
    fn from(err: gamecat_db::DbError) -> Self {
        DedupError::Store(StoreError::Db(err))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Db(gamecat_db::DbError::Sqlx(err))
    }
}
