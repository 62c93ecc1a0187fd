// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pool lifecycle manager.
//!
//! One `PoolManager` owns the shared pool handle and its lifecycle:
//! `Unconfigured -> Connecting -> Connected -> Closing -> Unconfigured`.
//! In-flight transitions are stored as shared futures, so concurrent
//! callers collapse onto one underlying connect or drain instead of
//! starting a second one. Constructed once at process start and passed by
//! reference to all call sites.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use millpond_config::{resolve, PoolOptions};
use millpond_core::{
    ConnectOptions, LifecycleStatus, PoolBackend, PoolError, PoolFactory, QueryOutcome, SqlParam,
};

use crate::augment::augment;
use crate::connection::Connection;
use crate::postgres::PgFactory;

/// Statement used to verify a freshly constructed pool can actually serve
/// queries before it is published.
pub(crate) const PROBE_SQL: &str = "SELECT TRUE";

type ConnectFuture = Shared<BoxFuture<'static, Result<Arc<dyn PoolBackend>, Arc<PoolError>>>>;
type DrainFuture = Shared<BoxFuture<'static, Result<(), Arc<PoolError>>>>;

/// Tagged lifecycle state. Inspected by matching on the tag only; the
/// `Connecting`/`Closing` variants hold the single outstanding transition.
enum Lifecycle {
    Unconfigured,
    Connecting(ConnectFuture),
    Connected(Arc<dyn PoolBackend>),
    Closing(DrainFuture),
}

enum Step {
    Join(ConnectFuture),
    Drain,
}

/// Owns the single shared pool handle and gates every operation on it.
pub struct PoolManager {
    factory: Arc<dyn PoolFactory>,
    state: Mutex<Lifecycle>,
}

impl PoolManager {
    /// A manager that constructs pools through the given factory.
    pub fn new(factory: Arc<dyn PoolFactory>) -> Self {
        Self {
            factory,
            state: Mutex::new(Lifecycle::Unconfigured),
        }
    }

    /// A manager backed by the sqlx Postgres factory.
    pub fn postgres() -> Self {
        Self::new(Arc::new(PgFactory))
    }

    /// The current lifecycle phase.
    pub async fn status(&self) -> LifecycleStatus {
        match &*self.state.lock().await {
            Lifecycle::Unconfigured => LifecycleStatus::Unconfigured,
            Lifecycle::Connecting(_) => LifecycleStatus::Connecting,
            Lifecycle::Connected(_) => LifecycleStatus::Connected,
            Lifecycle::Closing(_) => LifecycleStatus::Closing,
        }
    }

    /// Configure the shared pool, or return it if already configured.
    ///
    /// With no options and a connected pool this returns the existing handle
    /// without I/O; with no options while a connect is in flight it awaits
    /// that same connect. Otherwise any previous pool is drained first, the
    /// supplied options are merged over environment defaults, and a new pool
    /// is constructed and probed with one `SELECT TRUE` before being
    /// published. A failed probe reverts to `Unconfigured` and surfaces the
    /// probe error.
    pub async fn configure(
        &self,
        options: Option<PoolOptions>,
    ) -> Result<Arc<dyn PoolBackend>, PoolError> {
        loop {
            // Decide under the lock, and publish a new Connecting transition
            // in the same critical section: concurrent no-arg callers must
            // never be able to start a second connect.
            let step = {
                let mut state = self.state.lock().await;
                match (&options, &*state) {
                    (None, Lifecycle::Connected(pool)) => return Ok(Arc::clone(pool)),
                    (None, Lifecycle::Connecting(pending)) => Step::Join(pending.clone()),
                    (_, Lifecycle::Unconfigured) => {
                        let merged = resolve(options.clone())?;
                        let pending = self.spawn_connect(merged);
                        *state = Lifecycle::Connecting(pending.clone());
                        debug!("pool connecting");
                        Step::Join(pending)
                    }
                    // A previous handle (connected, draining, or still
                    // connecting) must be drained before it is replaced.
                    _ => Step::Drain,
                }
            };

            match step {
                Step::Join(pending) => return self.settle_connect(pending).await,
                Step::Drain => self.end().await?,
            }
        }
    }

    /// Drain the shared pool and reset to `Unconfigured`.
    ///
    /// Idempotent: a no-op before any configure, and concurrent or repeated
    /// callers collapse onto one in-flight drain.
    pub async fn end(&self) -> Result<(), PoolError> {
        enum EndStep {
            Join(DrainFuture),
            Settle(ConnectFuture),
        }

        let step = {
            let mut state = self.state.lock().await;
            match &*state {
                Lifecycle::Unconfigured => return Ok(()),
                Lifecycle::Closing(pending) => EndStep::Join(pending.clone()),
                Lifecycle::Connecting(pending) => EndStep::Settle(pending.clone()),
                Lifecycle::Connected(pool) => {
                    let pool = Arc::clone(pool);
                    let pending: DrainFuture =
                        async move { pool.end().await.map_err(Arc::new) }.boxed().shared();
                    *state = Lifecycle::Closing(pending.clone());
                    debug!("pool draining");
                    EndStep::Join(pending)
                }
            }
        };

        match step {
            EndStep::Settle(pending) => {
                // Let the in-flight connect finish (successfully or not),
                // then drain whatever it produced.
                let _ = self.settle_connect(pending).await;
                Box::pin(self.end()).await
            }
            EndStep::Join(pending) => {
                let result = pending.clone().await;
                let mut state = self.state.lock().await;
                // The handle is discarded whether or not the drain
                // succeeded; a failed drain still surfaces its error.
                if matches!(&*state, Lifecycle::Closing(f) if f.ptr_eq(&pending)) {
                    *state = Lifecycle::Unconfigured;
                    debug!("pool drained");
                }
                result.map_err(PoolError::from)
            }
        }
    }

    /// Future-style pool-level query. Fails with `NotConfigured` before a
    /// successful configure; execution failures come back augmented with the
    /// statement text and parameters.
    pub async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryOutcome, PoolError> {
        self.run_query(sql, params).await
    }

    /// Continuation-style pool-level query. Same internal execution path as
    /// [`query`](PoolManager::query), so augmentation behaves identically.
    pub async fn query_with<F, R>(&self, sql: &str, params: &[SqlParam], callback: F) -> R
    where
        F: FnOnce(Result<QueryOutcome, PoolError>) -> R + Send,
    {
        callback(self.run_query(sql, params).await)
    }

    /// Lease a dedicated connection from the configured pool.
    pub async fn connect(&self) -> Result<Connection, PoolError> {
        let pool = self.current().await?;
        Ok(Connection::new(pool.connect().await?))
    }

    /// The current pool handle, or `NotConfigured` if none is published.
    /// Transitional states reject as well: proxy operations never trigger
    /// configuration themselves.
    pub(crate) async fn current(&self) -> Result<Arc<dyn PoolBackend>, PoolError> {
        match &*self.state.lock().await {
            Lifecycle::Connected(pool) => Ok(Arc::clone(pool)),
            _ => Err(PoolError::NotConfigured),
        }
    }

    async fn run_query(&self, sql: &str, params: &[SqlParam]) -> Result<QueryOutcome, PoolError> {
        let pool = self.current().await?;
        pool.query(sql, params)
            .await
            .map_err(|e| augment(e, sql, params))
    }

    fn spawn_connect(&self, options: ConnectOptions) -> ConnectFuture {
        let factory = Arc::clone(&self.factory);
        async move {
            let pool = factory.create(&options).await.map_err(Arc::new)?;
            // The pool is published only after one successful liveness probe.
            pool.query(PROBE_SQL, &[])
                .await
                .map_err(|e| {
                    Arc::new(PoolError::Probe {
                        source: Box::new(e),
                    })
                })?;
            Ok(pool)
        }
        .boxed()
        .shared()
    }

    /// Await a shared connect and perform its state transition. Whichever
    /// waiter resumes first wins; `ptr_eq` guards against a newer transition
    /// having replaced this one in the meantime.
    async fn settle_connect(
        &self,
        pending: ConnectFuture,
    ) -> Result<Arc<dyn PoolBackend>, PoolError> {
        let result = pending.clone().await;
        let mut state = self.state.lock().await;
        let current = matches!(&*state, Lifecycle::Connecting(f) if f.ptr_eq(&pending));
        match result {
            Ok(pool) => {
                if current {
                    *state = Lifecycle::Connected(Arc::clone(&pool));
                    debug!("pool connected");
                }
                Ok(pool)
            }
            Err(err) => {
                if current {
                    *state = Lifecycle::Unconfigured;
                    warn!(error = %err, "pool connect failed");
                }
                Err(PoolError::from(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use millpond_test_utils::MockFactory;

    fn manager(factory: MockFactory) -> (PoolManager, Arc<MockFactory>) {
        let factory = Arc::new(factory);
        (PoolManager::new(Arc::clone(&factory) as Arc<dyn PoolFactory>), factory)
    }

    #[tokio::test]
    async fn status_walks_the_lifecycle() {
        let (manager, _factory) = manager(MockFactory::new());
        assert_eq!(manager.status().await, LifecycleStatus::Unconfigured);

        manager.configure(None).await.unwrap();
        assert_eq!(manager.status().await, LifecycleStatus::Connected);

        manager.end().await.unwrap();
        assert_eq!(manager.status().await, LifecycleStatus::Unconfigured);
    }

    #[tokio::test]
    async fn probe_failure_reverts_to_unconfigured() {
        let (manager, factory) = manager(MockFactory::failing_probe());

        let err = manager.configure(None).await.unwrap_err();
        assert!(err.is_probe(), "expected probe failure, got: {err}");
        assert_eq!(manager.status().await, LifecycleStatus::Unconfigured);
        assert_eq!(factory.create_count().await, 1);
    }

    #[tokio::test]
    async fn create_failure_surfaces_unwrapped() {
        let (manager, _factory) = manager(MockFactory::failing_create());

        let err = manager.configure(None).await.unwrap_err();
        assert!(matches!(err, PoolError::Backend { .. }), "got: {err}");
        assert_eq!(manager.status().await, LifecycleStatus::Unconfigured);
    }

    #[tokio::test]
    async fn proxies_reject_before_configure() {
        let (manager, _factory) = manager(MockFactory::new());

        let err = manager.query("SELECT 1", &[]).await.unwrap_err();
        assert!(matches!(err, PoolError::NotConfigured));

        let err = manager.connect().await.unwrap_err();
        assert!(matches!(err, PoolError::NotConfigured));
    }

    #[tokio::test]
    async fn probe_uses_the_select_true_statement() {
        let (manager, factory) = manager(MockFactory::new());
        manager.configure(None).await.unwrap();

        let backend = factory.backend().await.unwrap();
        assert_eq!(backend.pool_statements().await[0].0, PROBE_SQL);
    }
}
