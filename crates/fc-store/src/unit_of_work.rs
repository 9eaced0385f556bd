//! Transactional wrapper over the connection pool (§4.2).
//!
//! `with_tx` begins a transaction, hands the caller a live
//! `Transaction` handle, commits on `Ok`, and rolls back on `Err`. Every
//! repository call made with that handle runs on the transaction's own
//! connection, so a queue enqueue issued through it (§4.4) is atomic
//! with whatever else the closure does. The source's `WithTx` /
//! `WithTxAndReturn` split (the latter additionally exposing the raw
//! transaction handle for queue enqueues) collapses to this single
//! method here: sqlx transactions are already a first-class handle, so
//! there is nothing a "non-returning" variant would hide.
use futures::future::BoxFuture;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::StoreError;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `f` inside a transaction. Commits on `Ok`, rolls back on
    /// `Err`. A panic inside `f` unwinds before commit, so the
    /// transaction is dropped and rolled back by sqlx on drop.
    ///
    /// Generic over the caller's error type rather than fixed to
    /// `StoreError`: orchestrators (`fc-events`, `fc-jobs`) run queue
    /// enqueues and other sibling-crate calls inside the same closure,
    /// so `E` just needs `From<StoreError>` to let `?` cross both.
    pub async fn with_tx<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut Transaction<'_, Postgres>) -> BoxFuture<'c, Result<T, E>>
            + Send,
        T: Send,
        E: From<StoreError> + Send,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| E::from(StoreError::from_sqlx(e)))?;
        match f(&mut tx).await {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(|e| E::from(StoreError::from_sqlx(e)))?;
                Ok(value)
            }
            Err(err) => {
                let _ = tx.rollback().await;
                Err(err)
            }
        }
    }
}
