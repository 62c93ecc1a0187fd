// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query-error augmentation.
//!
//! Applied exactly at the pool-level and connection-level query boundaries.
//! Transaction bookkeeping statements (BEGIN/COMMIT/ROLLBACK) bypass this
//! and pass their errors through unchanged.

use millpond_core::{PoolError, SqlParam};

/// Wrap an execution failure with the statement text and bound parameters.
///
/// The original error is embedded whole and stays reachable through
/// `source()`; `params` is `None` when no parameters were supplied.
pub(crate) fn augment(source: PoolError, sql: &str, params: &[SqlParam]) -> PoolError {
    PoolError::Query {
        sql: sql.to_string(),
        params: (!params.is_empty()).then(|| params.to_vec()),
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn no_params_yields_absent_marker() {
        let err = augment(PoolError::NotConfigured, "INVALID QUERY", &[]);
        assert_eq!(err.sql(), Some("INVALID QUERY"));
        assert!(err.params().is_none());
    }

    #[test]
    fn bound_params_are_carried_verbatim() {
        let params = vec![SqlParam::Text("foo".into()), SqlParam::Int(2)];
        let err = augment(
            PoolError::Internal("boom".into()),
            "SELECT $1, $2",
            &params,
        );
        assert_eq!(err.params().unwrap(), params.as_slice());
    }

    #[test]
    fn original_error_is_embedded_not_replaced() {
        let err = augment(PoolError::Internal("boom".into()), "SELECT 1", &[]);
        let source = err.source().expect("source must survive augmentation");
        assert_eq!(source.to_string(), "internal error: boom");
    }
}
