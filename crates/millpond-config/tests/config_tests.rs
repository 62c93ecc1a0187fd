// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for millpond configuration resolution.
//!
//! Environment-dependent cases run inside `figment::Jail` so they never
//! touch the real process environment.

use millpond_config::{from_figment, PoolOptions};
use millpond_core::ConnectOptions;

use figment::providers::{Env, Serialized};
use figment::{Figment, Jail};
use serial_test::serial;

fn jailed_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ConnectOptions::default()))
        .merge(Env::prefixed("PG").only(&[
            "host",
            "port",
            "user",
            "password",
            "database",
            "max_connections",
        ]))
}

#[test]
#[serial]
fn defaults_apply_with_empty_environment() {
    Jail::expect_with(|_jail| {
        let options = from_figment(jailed_figment()).expect("defaults should resolve");
        assert_eq!(options, ConnectOptions::default());
        Ok(())
    });
}

#[test]
#[serial]
fn pg_environment_variables_override_defaults() {
    Jail::expect_with(|jail| {
        jail.set_env("PGHOST", "db.example.com");
        jail.set_env("PGPORT", "6432");
        jail.set_env("PGUSER", "svc");
        jail.set_env("PGPASSWORD", "hunter2");
        jail.set_env("PGDATABASE", "orders");

        let options = from_figment(jailed_figment()).expect("env should resolve");
        assert_eq!(options.host, "db.example.com");
        assert_eq!(options.port, 6432);
        assert_eq!(options.user, "svc");
        assert_eq!(options.password.as_deref(), Some("hunter2"));
        assert_eq!(options.database, "orders");
        Ok(())
    });
}

#[test]
#[serial]
fn unrelated_pg_variables_are_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("PGSSLMODE", "require");
        jail.set_env("PGOPTIONS", "-c statement_timeout=1s");
        jail.set_env("PGHOST", "db.example.com");

        let options = from_figment(jailed_figment()).expect("extra PG* vars must not break");
        assert_eq!(options.host, "db.example.com");
        assert!(options.extra.is_empty());
        Ok(())
    });
}

#[test]
#[serial]
fn caller_overrides_win_over_environment() {
    Jail::expect_with(|jail| {
        jail.set_env("PGHOST", "db.example.com");
        jail.set_env("PGDATABASE", "orders");

        let defaults = from_figment(jailed_figment()).expect("env should resolve");
        let merged = PoolOptions::default()
            .host("localhost")
            .port(5433)
            .merge_over(defaults);

        assert_eq!(merged.host, "localhost");
        assert_eq!(merged.port, 5433);
        // Env value survives where the caller was silent.
        assert_eq!(merged.database, "orders");
        Ok(())
    });
}

#[test]
#[serial]
fn malformed_port_is_a_config_error() {
    Jail::expect_with(|jail| {
        jail.set_env("PGPORT", "not-a-port");

        let err = from_figment(jailed_figment()).expect_err("bad port must not resolve");
        assert!(
            err.to_string().starts_with("configuration error:"),
            "got: {err}"
        );
        Ok(())
    });
}
