// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Leased-connection wrapper applying query-error augmentation.

use millpond_core::{PoolError, PooledConnection, QueryOutcome, SqlParam};

use crate::augment::augment;

/// A connection leased from the configured pool.
///
/// Exclusively owned by the holder until [`release`](Connection::release) is
/// called. If the wrapper is dropped without an explicit release, the
/// backend reclaims the connection under its own policy.
#[derive(Debug)]
pub struct Connection {
    inner: Option<Box<dyn PooledConnection>>,
}

impl Connection {
    pub(crate) fn new(inner: Box<dyn PooledConnection>) -> Self {
        Self { inner: Some(inner) }
    }

    /// Execute a statement on this connection. Failures come back augmented
    /// with the statement text and bound parameters.
    pub async fn query(
        &mut self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<QueryOutcome, PoolError> {
        self.raw_query(sql, params)
            .await
            .map_err(|e| augment(e, sql, params))
    }

    /// Execution path without augmentation, used for transaction bookkeeping
    /// statements whose errors must pass through unchanged.
    pub(crate) async fn raw_query(
        &mut self,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<QueryOutcome, PoolError> {
        match self.inner.as_mut() {
            Some(conn) => conn.query(sql, params).await,
            None => Err(PoolError::Internal("connection already released".into())),
        }
    }

    /// Return the connection to the pool. `error` is the failure that ended
    /// the lease, if any; passing it lets the backend discard a
    /// possibly-poisoned connection instead of recycling it.
    pub async fn release(mut self, error: Option<&PoolError>) {
        if let Some(conn) = self.inner.take() {
            conn.release(error).await;
        }
    }
}
