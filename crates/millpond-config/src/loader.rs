// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment-variable defaults using Figment for layered merging.
//!
//! Connection defaults follow the libpq convention: `PGHOST`, `PGPORT`,
//! `PGUSER`, `PGPASSWORD`, `PGDATABASE`, plus `PGMAX_CONNECTIONS` for the
//! pool bound. The environment is consulted once per configure call.

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use tracing::debug;

use millpond_core::{ConnectOptions, PoolError};

/// Keys recognized from the environment. The environment legitimately
/// carries other `PG*` variables (PGSSLMODE, PGOPTIONS, ...) that belong to
/// the driver, so the provider selects only these.
const ENV_KEYS: &[&str] = &[
    "host",
    "port",
    "user",
    "password",
    "database",
    "max_connections",
];

/// Read connection defaults from the process environment.
pub fn env_defaults() -> Result<ConnectOptions, PoolError> {
    let options = from_figment(env_figment())?;
    debug!(
        host = %options.host,
        port = options.port,
        database = %options.database,
        "resolved connection defaults from environment"
    );
    Ok(options)
}

/// Build the Figment used for default resolution (exposed so tests can
/// extract inside a jail without touching real process state).
pub fn env_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ConnectOptions::default()))
        .merge(env_provider())
}

/// Extract [`ConnectOptions`] from an arbitrary Figment.
pub fn from_figment(figment: Figment) -> Result<ConnectOptions, PoolError> {
    figment
        .extract()
        .map_err(|e| PoolError::Config(e.to_string()))
}

fn env_provider() -> Env {
    Env::prefixed("PG").only(ENV_KEYS)
}
