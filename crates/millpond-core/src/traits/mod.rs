// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the lifecycle manager and the external pool provider.
//!
//! All seams use `#[async_trait]` and are object-safe so the manager can hold
//! the current backend as `Arc<dyn PoolBackend>` regardless of driver.

pub mod backend;
pub mod connection;
pub mod factory;

// Re-export all traits at the traits module level for convenience.
pub use backend::PoolBackend;
pub use connection::PooledConnection;
pub use factory::PoolFactory;
