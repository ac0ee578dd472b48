//! Worker health aggregation.
//!
//! # Responsibilities
//! - Run pid file read → process existence → status probe, in that order
//! - Stop at the first failure and return its cause untouched
//! - Allow the configuration to be replaced between checks
//!
//! # Design Decisions
//! - All inputs arrive in one immutable `Dependencies` value; no globals
//! - Nothing is remembered between checks; every call re-verifies from scratch
//! - A reload builds a whole new checker; in-flight checks keep the old one

use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::HealthzConfig;
use crate::error::HealthError;
use crate::fs::Filesystem;
use crate::health::pidfile::{read_pid, ProcessId};
use crate::health::process::{ensure_running, ProcessProbe};
use crate::health::status::{build_client, StatusClient, StatusProbe};
use crate::health::{BoxError, HealthzCheck};

/// Everything a [`ProxyChecker`] needs, supplied at construction.
#[derive(Clone)]
pub struct Dependencies {
    pub config: HealthzConfig,
    pub filesystem: Arc<dyn Filesystem>,
    pub processes: Arc<dyn ProcessProbe>,
    pub client: StatusClient,
}

impl Dependencies {
    /// Bundle the capabilities with a status client sized for `config`.
    pub fn new(
        config: HealthzConfig,
        filesystem: Arc<dyn Filesystem>,
        processes: Arc<dyn ProcessProbe>,
    ) -> Self {
        let client = build_client(config.probe_timeout());
        Self {
            config,
            filesystem,
            processes,
            client,
        }
    }
}

/// Decides whether the managed worker is alive and serving.
pub struct ProxyChecker {
    name: String,
    pid_file: PathBuf,
    status_port: u16,
    status: StatusProbe,
    deps: Dependencies,
}

impl ProxyChecker {
    pub fn new(deps: Dependencies) -> Self {
        let config = &deps.config;
        let status = StatusProbe::new(
            deps.client.clone(),
            config.status_path.clone(),
            config.expected_body.clone(),
            config.probe_timeout(),
        );
        Self {
            name: config.service.clone(),
            pid_file: config.pid_file_path(),
            status_port: config.status_port,
            status,
            deps,
        }
    }

    /// A checker for `config` sharing this one's filesystem and process probe.
    pub fn reconfigured(&self, config: HealthzConfig) -> Self {
        Self::new(Dependencies::new(
            config,
            self.deps.filesystem.clone(),
            self.deps.processes.clone(),
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &HealthzConfig {
        &self.deps.config
    }

    /// Run one full check.
    pub async fn check(&self) -> Result<(), HealthError> {
        let started = Instant::now();
        match self.run().await {
            Ok(pid) => {
                tracing::debug!(
                    check = %self.name,
                    pid = %pid,
                    status_port = self.status_port,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Health check passed"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    check = %self.name,
                    stage = e.stage(),
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Health check failed"
                );
                Err(e)
            }
        }
    }

    async fn run(&self) -> Result<ProcessId, HealthError> {
        let deadline = self.deps.config.probe_timeout();
        let pid = read_pid(&self.deps.filesystem, &self.pid_file, deadline).await?;
        ensure_running(self.deps.processes.as_ref(), pid)?;
        self.status.probe(self.status_port).await?;
        Ok(pid)
    }
}

#[async_trait]
impl HealthzCheck for ProxyChecker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<(), BoxError> {
        ProxyChecker::check(self).await.map_err(Into::into)
    }
}

/// A [`ProxyChecker`] that can be replaced while the server is running.
///
/// The check name is fixed at construction so the mounted routes stay stable.
pub struct SwappableCheck {
    name: String,
    current: ArcSwap<ProxyChecker>,
}

impl SwappableCheck {
    pub fn new(checker: ProxyChecker) -> Self {
        Self {
            name: checker.name().to_string(),
            current: ArcSwap::from_pointee(checker),
        }
    }

    /// Snapshot of the checker used by the next probe.
    pub fn current(&self) -> Arc<ProxyChecker> {
        self.current.load_full()
    }

    /// Swap in a checker built from `config`.
    pub fn reload(&self, config: HealthzConfig) {
        let next = self.current().reconfigured(config);
        tracing::info!(
            check = %self.name,
            status_port = next.status_port,
            pid_file = %next.pid_file.display(),
            "Health checker reconfigured"
        );
        self.current.store(Arc::new(next));
    }
}

#[async_trait]
impl HealthzCheck for SwappableCheck {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<(), BoxError> {
        let checker = self.current();
        checker.check().await.map_err(Into::into)
    }
}
