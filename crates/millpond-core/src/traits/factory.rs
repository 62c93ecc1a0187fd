// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pool factory trait: constructs backends from resolved settings.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PoolError;
use crate::traits::backend::PoolBackend;
use crate::types::ConnectOptions;

/// Constructs a new pool backend from resolved connection settings.
///
/// The lifecycle manager calls this once per (re)configure, after merging
/// per-call overrides over environment defaults. Construction alone does not
/// make the pool usable; the manager still probes it before publishing.
#[async_trait]
pub trait PoolFactory: Send + Sync + 'static {
    async fn create(&self, options: &ConnectOptions) -> Result<Arc<dyn PoolBackend>, PoolError>;
}
