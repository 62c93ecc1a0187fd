// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the millpond pool manager.
//!
//! Two halves: environment-derived defaults (libpq `PG*` convention, loaded
//! via Figment) and per-call [`PoolOptions`] overrides merged over them.

pub mod loader;
pub mod overrides;

pub use loader::{env_defaults, env_figment, from_figment};
pub use overrides::PoolOptions;

use millpond_core::{ConnectOptions, PoolError};

/// Resolve the settings for one configure call: environment defaults first,
/// then the caller's overrides on top.
pub fn resolve(overrides: Option<PoolOptions>) -> Result<ConnectOptions, PoolError> {
    let defaults = env_defaults()?;
    Ok(overrides.unwrap_or_default().merge_over(defaults))
}
