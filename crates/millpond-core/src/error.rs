// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the millpond pool manager.

use std::sync::Arc;

use thiserror::Error;

use crate::types::SqlParam;

/// The primary error type used across the millpond workspace.
#[derive(Debug, Error)]
pub enum PoolError {
    /// An operation was attempted before a successful `configure`.
    #[error("pool is not configured -- call configure() first")]
    NotConfigured,

    /// Configuration errors (bad option values, environment parse failures).
    #[error("configuration error: {0}")]
    Config(String),

    /// The post-construction liveness probe failed; the pool was discarded.
    #[error("liveness probe failed: {source}")]
    Probe {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Backend/driver failures outside a tracked statement (connect, drain, release).
    #[error("backend error: {source}")]
    Backend {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A query failed. Carries the exact statement text and the bound
    /// parameters (if any) alongside the underlying failure.
    #[error("query failed: {source} (sql: {sql})")]
    Query {
        sql: String,
        params: Option<Vec<SqlParam>>,
        source: Box<PoolError>,
    },

    /// Failure surfaced to every caller awaiting one collapsed in-flight
    /// connect or drain.
    #[error("{0}")]
    Shared(#[source] Arc<PoolError>),

    /// Internal invariant violations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PoolError {
    /// The failing statement text, if this error was raised at a query boundary.
    pub fn sql(&self) -> Option<&str> {
        match self {
            PoolError::Query { sql, .. } => Some(sql),
            PoolError::Shared(inner) => inner.sql(),
            _ => None,
        }
    }

    /// The bound parameters of the failing statement. `None` when the error
    /// did not come from a query boundary or no parameters were supplied.
    pub fn params(&self) -> Option<&[SqlParam]> {
        match self {
            PoolError::Query { params, .. } => params.as_deref(),
            PoolError::Shared(inner) => inner.params(),
            _ => None,
        }
    }

    /// Whether this error (or the failure it carries) is a probe failure.
    pub fn is_probe(&self) -> bool {
        match self {
            PoolError::Probe { .. } => true,
            PoolError::Shared(inner) => inner.is_probe(),
            _ => false,
        }
    }
}

/// Unwraps a shared failure when this caller was the only waiter, so the
/// single-caller path surfaces the original error unwrapped.
impl From<Arc<PoolError>> for PoolError {
    fn from(err: Arc<PoolError>) -> Self {
        match Arc::try_unwrap(err) {
            Ok(err) => err,
            Err(err) => PoolError::Shared(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_exposes_sql_and_params() {
        let err = PoolError::Query {
            sql: "INVALID QUERY".to_string(),
            params: None,
            source: Box::new(PoolError::Internal("boom".into())),
        };
        assert_eq!(err.sql(), Some("INVALID QUERY"));
        assert!(err.params().is_none());

        let err = PoolError::Query {
            sql: "SELECT $1".to_string(),
            params: Some(vec![SqlParam::Text("foo".into())]),
            source: Box::new(PoolError::Internal("boom".into())),
        };
        assert_eq!(err.params().unwrap()[0], SqlParam::Text("foo".into()));
    }

    #[test]
    fn sole_waiter_gets_original_error_back() {
        let arc = Arc::new(PoolError::NotConfigured);
        let err = PoolError::from(arc);
        assert!(matches!(err, PoolError::NotConfigured));
    }

    #[test]
    fn contended_arc_wraps_in_shared() {
        let arc = Arc::new(PoolError::Internal("boom".into()));
        let _second = Arc::clone(&arc);
        let err = PoolError::from(arc);
        assert!(matches!(err, PoolError::Shared(_)));
        assert_eq!(err.to_string(), "internal error: boom");
    }

    #[test]
    fn shared_failure_exposes_inner_error_as_source() {
        use std::error::Error;

        let err = PoolError::Shared(Arc::new(PoolError::NotConfigured));
        let source = err.source().expect("inner error must be reachable");
        assert_eq!(source.to_string(), PoolError::NotConfigured.to_string());
    }

    #[test]
    fn query_error_preserves_source_identity() {
        use std::error::Error;

        let err = PoolError::Query {
            sql: "SELECT 1".to_string(),
            params: None,
            source: Box::new(PoolError::Internal("boom".into())),
        };
        let source = err.source().expect("source must be preserved");
        assert_eq!(source.to_string(), "internal error: boom");
    }
}
