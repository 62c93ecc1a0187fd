// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for millpond integration tests.
//!
//! Provides a fully in-memory [`MockBackend`]/[`MockFactory`] pair so the
//! lifecycle manager and transaction runner can be exercised without a
//! Postgres server: statement accounting, release tracking, failure
//! injection, and a toy transactional table.

pub mod mock_backend;
pub mod mock_factory;

pub use mock_backend::MockBackend;
pub use mock_factory::MockFactory;
