// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transaction helper.
//!
//! One connection is leased for the whole unit of work; exactly one of
//! COMMIT or ROLLBACK is issued per invocation, and the connection is
//! released exactly once on every path.

use futures::future::BoxFuture;
use tracing::warn;

use millpond_core::PoolError;

use crate::connection::Connection;
use crate::manager::PoolManager;

/// Flags composed into the BEGIN statement. All independently optional and
/// combinable; combinations the engine would reject are passed through
/// rather than validated locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionOptions {
    pub serializable: bool,
    pub read_only: bool,
    pub deferrable: bool,
}

impl TransactionOptions {
    pub fn serializable(mut self) -> Self {
        self.serializable = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn deferrable(mut self) -> Self {
        self.deferrable = true;
        self
    }

    /// Compose the BEGIN statement: isolation level, then access mode, then
    /// the deferrable modifier.
    pub(crate) fn begin_statement(&self) -> String {
        let mut stmt = String::from("BEGIN");
        if self.serializable {
            stmt.push_str(" ISOLATION LEVEL SERIALIZABLE");
        }
        if self.read_only {
            stmt.push_str(" READ ONLY");
        }
        if self.deferrable {
            stmt.push_str(" DEFERRABLE");
        }
        stmt
    }
}

impl PoolManager {
    /// Run `work` inside a transaction on a dedicated connection.
    ///
    /// On success the transaction is committed and the connection released
    /// cleanly; on any failure of BEGIN, the work, or COMMIT, a best-effort
    /// ROLLBACK is issued, the connection is released with the error
    /// signaled (so the backend may discard it), and the original error is
    /// re-raised. Bookkeeping statements pass their errors through without
    /// augmentation.
    pub async fn transaction<T, F>(
        &self,
        options: Option<TransactionOptions>,
        work: F,
    ) -> Result<T, PoolError>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut Connection) -> BoxFuture<'c, Result<T, PoolError>> + Send,
    {
        let pool = self.current().await?;
        let mut conn = Connection::new(pool.connect().await?);
        let begin = options.unwrap_or_default().begin_statement();

        let outcome = async {
            conn.raw_query(&begin, &[]).await?;
            let value = work(&mut conn).await?;
            conn.raw_query("COMMIT", &[]).await?;
            Ok(value)
        }
        .await;

        match outcome {
            Ok(value) => {
                conn.release(None).await;
                Ok(value)
            }
            Err(err) => {
                // Best-effort: a rollback failure never masks the original
                // error, and the connection is still released.
                if let Err(rollback_err) = conn.raw_query("ROLLBACK", &[]).await {
                    warn!(error = %rollback_err, "rollback after failed transaction also failed");
                }
                conn.release(Some(&err)).await;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_begin_by_default() {
        assert_eq!(TransactionOptions::default().begin_statement(), "BEGIN");
    }

    #[test]
    fn flags_compose_in_fixed_order() {
        assert_eq!(
            TransactionOptions::default().serializable().begin_statement(),
            "BEGIN ISOLATION LEVEL SERIALIZABLE"
        );
        assert_eq!(
            TransactionOptions::default().read_only().begin_statement(),
            "BEGIN READ ONLY"
        );
        assert_eq!(
            TransactionOptions::default().deferrable().begin_statement(),
            "BEGIN DEFERRABLE"
        );
        assert_eq!(
            TransactionOptions::default()
                .serializable()
                .read_only()
                .deferrable()
                .begin_statement(),
            "BEGIN ISOLATION LEVEL SERIALIZABLE READ ONLY DEFERRABLE"
        );
    }
}
