// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the millpond pool manager.
//!
//! This crate provides the foundational trait seams, error types, and common
//! types used throughout the millpond workspace. The lifecycle manager and
//! any pool provider implementation both build on the definitions here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PoolError;
pub use types::{ConnectOptions, LifecycleStatus, QueryOutcome, SqlParam};

// Re-export the trait seams at crate root.
pub use traits::{PoolBackend, PoolFactory, PooledConnection};
