use std::{future::Future, time::Duration};

use canvas_application::error::{AppError, AppResult};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tokio::time::timeout;

/// Wraps every statement in a timeout so a wedged connection cannot hang a
/// worker tick forever.
pub struct SqliteExecutor {
    timeout_secs: u64,
}

impl SqliteExecutor {
    #[must_use]
    pub const fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    pub async fn execute_with_timeout<T, F, Fut>(
        &self,
        operation: F,
        error_context: &str,
    ) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        timeout(Duration::from_secs(self.timeout_secs), operation())
            .await
            .map_err(|_| AppError::Database {
                message: format!("{error_context}: timed out"),
            })?
            .map_err(|e| AppError::Database {
                message: format!("{error_context}: {e}"),
            })
    }
}

pub async fn begin_transaction(pool: &SqlitePool) -> AppResult<Transaction<'_, Sqlite>> {
    pool.begin().await.map_err(|e| AppError::Database {
        message: format!("failed to begin transaction: {e}"),
    })
}

pub async fn commit_transaction(tx: Transaction<'_, Sqlite>) -> AppResult<()> {
    tx.commit().await.map_err(|e| AppError::Database {
        message: format!("failed to commit transaction: {e}"),
    })
}
