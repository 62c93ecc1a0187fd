// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared Postgres pool lifecycle manager.
//!
//! One [`PoolManager`] owns the process-wide pool handle: it configures the
//! pool lazily and exactly once under concurrent callers, proxies
//! query/connect operations once configured, and runs units of work inside
//! transactions with guaranteed BEGIN/COMMIT/ROLLBACK sequencing and
//! exactly-once connection release. Query failures at the proxy boundaries
//! come back augmented with the failing statement and its parameters.
//!
//! ```no_run
//! use millpond_pool::{PoolManager, PoolOptions, SqlParam};
//! use futures::FutureExt;
//!
//! # async fn example() -> Result<(), millpond_pool::PoolError> {
//! let manager = PoolManager::postgres();
//! manager
//!     .configure(Some(PoolOptions::default().host("localhost").database("app")))
//!     .await?;
//!
//! let inserted = manager
//!     .transaction(None, |conn| {
//!         async move {
//!             conn.query(
//!                 "INSERT INTO items (name) VALUES ($1) RETURNING id",
//!                 &[SqlParam::from("widget")],
//!             )
//!             .await
//!         }
//!         .boxed()
//!     })
//!     .await?;
//! # let _ = inserted;
//! manager.end().await?;
//! # Ok(())
//! # }
//! ```

mod augment;
pub mod connection;
pub mod manager;
pub mod postgres;
pub mod transaction;

pub use connection::Connection;
pub use manager::PoolManager;
pub use postgres::{PgBackend, PgFactory};
pub use transaction::TransactionOptions;

// Re-export the surface callers need so one import path suffices.
pub use millpond_config::PoolOptions;
pub use millpond_core::{
    ConnectOptions, LifecycleStatus, PoolBackend, PoolError, PoolFactory, PooledConnection,
    QueryOutcome, SqlParam,
};
