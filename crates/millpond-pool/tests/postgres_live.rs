// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tests against a real Postgres server.
//!
//! Ignored by default; run with `cargo test -- --ignored` against a server
//! reachable through the standard PG* environment variables (PGHOST,
//! PGPORT, PGUSER, PGPASSWORD, PGDATABASE).

use futures::FutureExt;
use serial_test::serial;

use millpond_pool::{PoolManager, SqlParam};

#[tokio::test]
#[ignore = "requires a running Postgres server"]
#[serial]
async fn configure_query_and_end() {
    let manager = PoolManager::postgres();
    manager.configure(None).await.unwrap();

    let outcome = manager.query("SELECT 1 + 2", &[]).await.unwrap();
    assert_eq!(outcome.first_value(), Some(&serde_json::json!(3)));

    manager.end().await.unwrap();
    manager.end().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Postgres server"]
#[serial]
async fn parameters_bind_and_rows_decode() {
    let manager = PoolManager::postgres();
    manager.configure(None).await.unwrap();

    let outcome = manager
        .query(
            "SELECT $1::text, $2::int8, $3::bool",
            &[
                SqlParam::from("hello"),
                SqlParam::from(7i64),
                SqlParam::from(true),
            ],
        )
        .await
        .unwrap();
    assert_eq!(
        outcome.rows,
        vec![vec![
            serde_json::json!("hello"),
            serde_json::json!(7),
            serde_json::json!(true),
        ]]
    );

    manager.end().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Postgres server"]
#[serial]
async fn transaction_commits_and_rolls_back() {
    let manager = PoolManager::postgres();
    manager.configure(None).await.unwrap();

    manager
        .query("CREATE TABLE IF NOT EXISTS live_items (id bigserial PRIMARY KEY, name text)", &[])
        .await
        .unwrap();
    manager.query("TRUNCATE live_items", &[]).await.unwrap();

    manager
        .transaction(None, |conn| {
            async move {
                conn.query(
                    "INSERT INTO live_items (name) VALUES ($1)",
                    &[SqlParam::from("kept")],
                )
                .await
            }
            .boxed()
        })
        .await
        .unwrap();

    let err = manager
        .transaction::<(), _>(None, |conn| {
            async move {
                conn.query(
                    "INSERT INTO live_items (name) VALUES ($1)",
                    &[SqlParam::from("discarded")],
                )
                .await?;
                Err(millpond_pool::PoolError::Internal("abort".into()))
            }
            .boxed()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, millpond_pool::PoolError::Internal(_)));

    let outcome = manager
        .query("SELECT COUNT(*) FROM live_items", &[])
        .await
        .unwrap();
    assert_eq!(outcome.first_value(), Some(&serde_json::json!(1)));

    manager.query("DROP TABLE live_items", &[]).await.unwrap();
    manager.end().await.unwrap();
}
