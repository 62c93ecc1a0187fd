// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the pool manager and its trait seams.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The lifecycle phase of the shared pool singleton.
///
/// Exactly one of these is current at any time; `Connecting` and `Closing`
/// hold the one in-flight transition that concurrent callers collapse onto.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum LifecycleStatus {
    Unconfigured,
    Connecting,
    Connected,
    Closing,
}

/// A bound statement parameter.
///
/// Parameters cross the object-safe backend seam as owned values; result
/// typing beyond this small set is out of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(serde_json::Value),
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(v.into())
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<serde_json::Value> for SqlParam {
    fn from(v: serde_json::Value) -> Self {
        SqlParam::Json(v)
    }
}

/// The result of executing a statement: how many rows it affected, and any
/// rows it returned, decoded into loosely typed JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    pub rows_affected: u64,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl QueryOutcome {
    /// The first column of the first returned row, if any. Convenient for
    /// single-value statements such as `INSERT ... RETURNING id`.
    pub fn first_value(&self) -> Option<&serde_json::Value> {
        self.rows.first().and_then(|row| row.first())
    }
}

/// Resolved connection settings for constructing a pool backend.
///
/// Produced by merging per-call overrides on top of environment defaults;
/// by the time a backend sees this, every field is settled.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConnectOptions {
    /// Connect target host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Connect port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Credential user name.
    #[serde(default = "default_user")]
    pub user: String,

    /// Credential password, if the server requires one.
    #[serde(default)]
    pub password: Option<String>,

    /// Target database name.
    #[serde(default = "default_database")]
    pub database: String,

    /// Upper bound on pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Provider-specific options, passed through to the backend unchanged.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: default_user(),
            password: None,
            database: default_database(),
            max_connections: default_max_connections(),
            extra: BTreeMap::new(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_database() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    10
}
