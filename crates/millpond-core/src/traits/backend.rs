// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pool backend trait: the capability a pool handle supplies.

use async_trait::async_trait;

use crate::error::PoolError;
use crate::traits::connection::PooledConnection;
use crate::types::{QueryOutcome, SqlParam};

/// An opaque pool of reusable database connections.
///
/// The lifecycle manager exclusively owns the current backend; everything
/// else borrows it for the duration of a single operation. Implementations
/// must be safe to call from many tasks concurrently.
#[async_trait]
pub trait PoolBackend: Send + Sync + 'static {
    /// Leases a dedicated connection from the pool.
    async fn connect(&self) -> Result<Box<dyn PooledConnection>, PoolError>;

    /// Executes one statement on any free pooled connection.
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryOutcome, PoolError>;

    /// Gracefully drains the pool, waiting for leased connections to return.
    async fn end(&self) -> Result<(), PoolError>;
}

impl std::fmt::Debug for dyn PoolBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn PoolBackend")
    }
}
