// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Postgres pool backend over sqlx.
//!
//! Implements the backend seams with a `PgPool`: leased connections are
//! sqlx pool connections, `end` drains via `Pool::close`, and a release
//! carrying an error closes the connection instead of recycling it.
//! Returned rows are decoded into loosely typed JSON values for a small set
//! of common Postgres types; result typing beyond that is out of scope.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Connection as _, Either, Executor, Postgres, Row, TypeInfo};
use tracing::{debug, warn};

use millpond_core::{
    ConnectOptions, PoolBackend, PoolError, PoolFactory, PooledConnection, QueryOutcome, SqlParam,
};

/// Constructs [`PgBackend`]s from resolved connection settings.
pub struct PgFactory;

#[async_trait]
impl PoolFactory for PgFactory {
    async fn create(&self, options: &ConnectOptions) -> Result<Arc<dyn PoolBackend>, PoolError> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .connect_with(build_connect_options(options))
            .await
            .map_err(map_sqlx_err)?;
        debug!(
            host = %options.host,
            port = options.port,
            database = %options.database,
            "postgres pool created"
        );
        Ok(Arc::new(PgBackend { pool }))
    }
}

/// A pool handle backed by `sqlx::PgPool`.
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    /// Wrap an existing sqlx pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PoolBackend for PgBackend {
    async fn connect(&self) -> Result<Box<dyn PooledConnection>, PoolError> {
        let conn = self.pool.acquire().await.map_err(map_sqlx_err)?;
        Ok(Box::new(PgPooledConnection { conn }))
    }

    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryOutcome, PoolError> {
        run_statement(&self.pool, sql, params).await
    }

    async fn end(&self) -> Result<(), PoolError> {
        self.pool.close().await;
        Ok(())
    }
}

struct PgPooledConnection {
    conn: sqlx::pool::PoolConnection<Postgres>,
}

#[async_trait]
impl PooledConnection for PgPooledConnection {
    async fn query(&mut self, sql: &str, params: &[SqlParam]) -> Result<QueryOutcome, PoolError> {
        run_statement(&mut *self.conn, sql, params).await
    }

    async fn release(self: Box<Self>, error: Option<&PoolError>) {
        let this = *self;
        if error.is_some() {
            // The lease ended in an error; detach the connection from the
            // pool and close it instead of recycling a possibly-poisoned one.
            if let Err(close_err) = this.conn.detach().close().await {
                warn!(error = %close_err, "failed to close poisoned connection");
            }
            return;
        }
        // Clean release: dropping returns the connection to the pool.
    }
}

fn build_connect_options(options: &ConnectOptions) -> PgConnectOptions {
    let mut connect = PgConnectOptions::new()
        .host(&options.host)
        .port(options.port)
        .username(&options.user)
        .database(&options.database);
    if let Some(password) = &options.password {
        connect = connect.password(password);
    }
    if !options.extra.is_empty() {
        connect = connect.options(
            options
                .extra
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        );
    }
    connect
}

async fn run_statement<'e, E>(
    executor: E,
    sql: &str,
    params: &[SqlParam],
) -> Result<QueryOutcome, PoolError>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = bind_params(sqlx::query(sql), params);
    let mut stream = executor.fetch_many(query);

    let mut outcome = QueryOutcome::default();
    while let Some(step) = stream.try_next().await.map_err(map_sqlx_err)? {
        match step {
            Either::Left(done) => outcome.rows_affected += done.rows_affected(),
            Either::Right(row) => outcome.rows.push(decode_row(&row)),
        }
    }
    Ok(outcome)
}

fn bind_params<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    let mut query = query;
    for param in params {
        query = match param {
            SqlParam::Null => query.bind(Option::<String>::None),
            SqlParam::Bool(v) => query.bind(*v),
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Float(v) => query.bind(*v),
            SqlParam::Text(v) => query.bind(v.clone()),
            SqlParam::Json(v) => query.bind(v.clone()),
        };
    }
    query
}

fn decode_row(row: &PgRow) -> Vec<Value> {
    (0..row.len()).map(|idx| decode_column(row, idx)).collect()
}

/// Decode one column into a JSON value. Unknown types degrade to their text
/// representation where the driver allows it, else NULL.
fn decode_column(row: &PgRow, idx: usize) -> Value {
    match row.column(idx).type_info().name() {
        "BOOL" => row
            .try_get::<Option<bool>, _>(idx)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::Bool),
        "INT2" => row
            .try_get::<Option<i16>, _>(idx)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::from),
        "INT4" => row
            .try_get::<Option<i32>, _>(idx)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::from),
        "INT8" => row
            .try_get::<Option<i64>, _>(idx)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::from),
        "FLOAT4" => row
            .try_get::<Option<f32>, _>(idx)
            .ok()
            .flatten()
            .map_or(Value::Null, |v| Value::from(f64::from(v))),
        "FLOAT8" => row
            .try_get::<Option<f64>, _>(idx)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::from),
        "JSON" | "JSONB" => row
            .try_get::<Option<Value>, _>(idx)
            .ok()
            .flatten()
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<Option<String>, _>(idx)
            .ok()
            .flatten()
            .map_or(Value::Null, Value::String),
    }
}

fn map_sqlx_err(err: sqlx::Error) -> PoolError {
    PoolError::Backend {
        source: Box::new(err),
    }
}
