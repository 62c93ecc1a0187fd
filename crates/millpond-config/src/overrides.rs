// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-call configuration overrides.
//!
//! A `configure` caller may override any subset of the environment-derived
//! defaults; explicit options win on key collision.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use millpond_core::ConnectOptions;

/// Options supplied to a single `configure` call. Every field is optional;
/// unset fields fall back to the environment-derived defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PoolOptions {
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub max_connections: Option<u32>,

    /// Provider-specific options, passed through to the backend unchanged.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl PoolOptions {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = Some(max);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Merge these overrides on top of resolved defaults.
    pub fn merge_over(self, base: ConnectOptions) -> ConnectOptions {
        let mut merged = base;
        if let Some(host) = self.host {
            merged.host = host;
        }
        if let Some(port) = self.port {
            merged.port = port;
        }
        if let Some(user) = self.user {
            merged.user = user;
        }
        if let Some(password) = self.password {
            merged.password = Some(password);
        }
        if let Some(database) = self.database {
            merged.database = database;
        }
        if let Some(max) = self.max_connections {
            merged.max_connections = max;
        }
        merged.extra.extend(self.extra);
        merged
    }
}
