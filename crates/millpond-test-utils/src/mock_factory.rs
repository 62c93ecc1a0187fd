// SPDX-FileCopyrightText: 2026 Millpond Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock pool factory for lifecycle tests.
//!
//! Records every `create` call with its resolved options, optionally delays
//! construction to widen race windows in concurrency tests, and can inject
//! creation or probe failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use millpond_core::{ConnectOptions, PoolBackend, PoolError, PoolFactory};

use crate::mock_backend::MockBackend;

#[derive(Default)]
struct FactoryState {
    created: Vec<ConnectOptions>,
    backends: Vec<Arc<MockBackend>>,
    fail_create: bool,
    fail_probe: bool,
    connect_delay: Option<Duration>,
}

/// Constructs [`MockBackend`]s and keeps a record of every construction.
pub struct MockFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self::with_state(FactoryState::default())
    }

    /// A factory whose `create` always fails.
    pub fn failing_create() -> Self {
        Self::with_state(FactoryState {
            fail_create: true,
            ..FactoryState::default()
        })
    }

    /// A factory whose backends fail the liveness probe.
    pub fn failing_probe() -> Self {
        Self::with_state(FactoryState {
            fail_probe: true,
            ..FactoryState::default()
        })
    }

    /// Delay each `create` by `delay`, keeping the lifecycle in its
    /// connecting phase long enough for concurrent callers to pile up.
    pub fn with_connect_delay(delay: Duration) -> Self {
        Self::with_state(FactoryState {
            connect_delay: Some(delay),
            ..FactoryState::default()
        })
    }

    fn with_state(state: FactoryState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// How many backends this factory has constructed.
    pub async fn create_count(&self) -> usize {
        self.state.lock().await.created.len()
    }

    /// The resolved options of every `create` call, in order.
    pub async fn created_options(&self) -> Vec<ConnectOptions> {
        self.state.lock().await.created.clone()
    }

    /// The most recently constructed backend, if any.
    pub async fn backend(&self) -> Option<Arc<MockBackend>> {
        self.state.lock().await.backends.last().cloned()
    }
}

impl Default for MockFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PoolFactory for MockFactory {
    async fn create(&self, options: &ConnectOptions) -> Result<Arc<dyn PoolBackend>, PoolError> {
        let (delay, fail_create, fail_probe) = {
            let mut state = self.state.lock().await;
            state.created.push(options.clone());
            (state.connect_delay, state.fail_create, state.fail_probe)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if fail_create {
            return Err(PoolError::Backend {
                source: Box::new(std::io::Error::other("injected create failure")),
            });
        }

        let backend = Arc::new(MockBackend::new());
        if fail_probe {
            backend.fail_statements_containing("SELECT TRUE").await;
        }
        self.state.lock().await.backends.push(Arc::clone(&backend));
        Ok(backend)
    }
}
