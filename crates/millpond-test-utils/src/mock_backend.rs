// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock pool backend for deterministic testing.
//!
//! `MockBackend` implements `PoolBackend`/`PooledConnection` over an
//! in-memory ledger that records every statement, connect, release, and
//! drain, with substring-based failure injection. It also simulates one
//! tiny transactional table (auto-incrementing ids, pending rows merged on
//! COMMIT and discarded on ROLLBACK) so commit/rollback visibility can be
//! asserted without a server.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use millpond_core::{PoolBackend, PoolError, PooledConnection, QueryOutcome, SqlParam};

#[derive(Default)]
struct MockLedger {
    pool_statements: Vec<(String, Vec<SqlParam>)>,
    conn_statements: Vec<(String, Vec<SqlParam>)>,
    connects: usize,
    ends: usize,
    releases: Vec<Option<String>>,
    fail_fragments: Vec<String>,
    fail_connect: bool,
    fail_end: bool,
    committed: Vec<i64>,
    pending: HashMap<u64, Vec<i64>>,
    in_txn: HashSet<u64>,
    next_id: i64,
    next_conn: u64,
}

impl MockLedger {
    fn execute(
        &mut self,
        conn: Option<u64>,
        sql: &str,
        params: &[SqlParam],
    ) -> Result<QueryOutcome, PoolError> {
        match conn {
            Some(_) => self.conn_statements.push((sql.to_string(), params.to_vec())),
            None => self.pool_statements.push((sql.to_string(), params.to_vec())),
        }

        for fragment in &self.fail_fragments {
            if sql.contains(fragment.as_str()) {
                return Err(PoolError::Backend {
                    source: Box::new(std::io::Error::other(format!(
                        "injected failure for statement: {sql}"
                    ))),
                });
            }
        }

        let upper = sql.trim().to_ascii_uppercase();
        let mut outcome = QueryOutcome::default();

        if upper.starts_with("BEGIN") {
            if let Some(id) = conn {
                self.in_txn.insert(id);
                self.pending.insert(id, Vec::new());
            }
        } else if upper.starts_with("COMMIT") {
            if let Some(id) = conn {
                self.in_txn.remove(&id);
                let rows = self.pending.remove(&id).unwrap_or_default();
                self.committed.extend(rows);
            }
        } else if upper.starts_with("ROLLBACK") {
            if let Some(id) = conn {
                self.in_txn.remove(&id);
                self.pending.remove(&id);
            }
        } else if upper.starts_with("INSERT") {
            self.next_id += 1;
            let id = self.next_id;
            match conn.filter(|c| self.in_txn.contains(c)) {
                Some(c) => self.pending.entry(c).or_default().push(id),
                None => self.committed.push(id),
            }
            outcome.rows_affected = 1;
            if upper.contains("RETURNING") {
                outcome.rows.push(vec![json!(id)]);
            }
        } else if upper.starts_with("SELECT TRUE") {
            outcome.rows.push(vec![json!(true)]);
        } else if upper.contains("COUNT") {
            let mut count = self.committed.len();
            if let Some(c) = conn.filter(|c| self.in_txn.contains(c)) {
                count += self.pending.get(&c).map_or(0, Vec::len);
            }
            outcome.rows.push(vec![json!(count as i64)]);
        } else if upper.starts_with("SELECT") {
            for id in &self.committed {
                outcome.rows.push(vec![json!(*id)]);
            }
        }

        Ok(outcome)
    }
}

/// In-memory pool backend with statement accounting and failure injection.
pub struct MockBackend {
    ledger: Arc<Mutex<MockLedger>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(Mutex::new(MockLedger::default())),
        }
    }

    /// Make every statement containing `fragment` fail from now on.
    pub async fn fail_statements_containing(&self, fragment: &str) {
        self.ledger
            .lock()
            .await
            .fail_fragments
            .push(fragment.to_string());
    }

    /// Make `connect` fail from now on.
    pub async fn fail_connect(&self) {
        self.ledger.lock().await.fail_connect = true;
    }

    /// Make `end` fail from now on.
    pub async fn fail_end(&self) {
        self.ledger.lock().await.fail_end = true;
    }

    /// Statements executed at the pool level, in order.
    pub async fn pool_statements(&self) -> Vec<(String, Vec<SqlParam>)> {
        self.ledger.lock().await.pool_statements.clone()
    }

    /// Statements executed on leased connections, in order.
    pub async fn conn_statements(&self) -> Vec<(String, Vec<SqlParam>)> {
        self.ledger.lock().await.conn_statements.clone()
    }

    /// How many statements (pool- or connection-level) contain `fragment`.
    pub async fn statement_count(&self, fragment: &str) -> usize {
        let ledger = self.ledger.lock().await;
        ledger
            .pool_statements
            .iter()
            .chain(ledger.conn_statements.iter())
            .filter(|(sql, _)| sql.contains(fragment))
            .count()
    }

    /// How many liveness probes this backend has served.
    pub async fn probe_count(&self) -> usize {
        self.statement_count("SELECT TRUE").await
    }

    pub async fn connect_count(&self) -> usize {
        self.ledger.lock().await.connects
    }

    pub async fn end_count(&self) -> usize {
        self.ledger.lock().await.ends
    }

    /// One entry per release, carrying the error message the lease ended
    /// with, or `None` for a clean release.
    pub async fn releases(&self) -> Vec<Option<String>> {
        self.ledger.lock().await.releases.clone()
    }

    /// Ids currently visible in the toy table (committed only).
    pub async fn committed_rows(&self) -> Vec<i64> {
        self.ledger.lock().await.committed.clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoolBackend for MockBackend {
    async fn connect(&self) -> Result<Box<dyn PooledConnection>, PoolError> {
        let mut ledger = self.ledger.lock().await;
        ledger.connects += 1;
        if ledger.fail_connect {
            return Err(PoolError::Backend {
                source: Box::new(std::io::Error::other("injected connect failure")),
            });
        }
        ledger.next_conn += 1;
        Ok(Box::new(MockConnection {
            id: ledger.next_conn,
            ledger: Arc::clone(&self.ledger),
        }))
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryOutcome, PoolError> {
        self.ledger.lock().await.execute(None, sql, params)
    }

    async fn end(&self) -> Result<(), PoolError> {
        let mut ledger = self.ledger.lock().await;
        ledger.ends += 1;
        if ledger.fail_end {
            return Err(PoolError::Backend {
                source: Box::new(std::io::Error::other("injected drain failure")),
            });
        }
        Ok(())
    }
}

struct MockConnection {
    id: u64,
    ledger: Arc<Mutex<MockLedger>>,
}

#[async_trait]
impl PooledConnection for MockConnection {
    async fn query(&mut self, sql: &str, params: &[SqlParam]) -> Result<QueryOutcome, PoolError> {
        self.ledger.lock().await.execute(Some(self.id), sql, params)
    }

    async fn release(self: Box<Self>, error: Option<&PoolError>) {
        let mut ledger = self.ledger.lock().await;
        ledger.releases.push(error.map(ToString::to_string));
        // Any transaction left open on this connection is gone with it.
        ledger.in_txn.remove(&self.id);
        ledger.pending.remove(&self.id);
    }
}
