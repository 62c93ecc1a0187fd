// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pooled connection trait: the capability a leased connection supplies.

use async_trait::async_trait;

use crate::error::PoolError;
use crate::types::{QueryOutcome, SqlParam};

/// A connection leased from a [`PoolBackend`](crate::traits::PoolBackend).
///
/// Leased connections are exclusively owned by one caller until released.
/// `release` consumes the lease, so a connection can be given back at most
/// once; passing the error that ended the lease lets the backend discard a
/// possibly-poisoned connection instead of recycling it.
#[async_trait]
pub trait PooledConnection: Send + Sync {
    /// Executes one statement on this connection.
    async fn query(&mut self, sql: &str, params: &[SqlParam]) -> Result<QueryOutcome, PoolError>;

    /// Returns the connection to the pool. `error` is the failure that ended
    /// the lease, if any.
    async fn release(self: Box<Self>, error: Option<&PoolError>);
}

impl std::fmt::Debug for dyn PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn PooledConnection")
    }
}
