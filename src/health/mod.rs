//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /healthz (http::healthz)
//!     → HealthzCheck::check for every mounted check
//!         → checker.rs   ProxyChecker (fail-fast)
//!             → pidfile.rs  read & parse pid   (via fs::Filesystem)
//!             → process.rs  kill(pid, 0)       (via ProcessProbe)
//!             → status.rs   GET 127.0.0.1:<status_port><status_path>
//!     → 200 "ok" | 500 + cause
//! ```
//!
//! # Design Decisions
//! - Two observable states only: healthy or not. No thresholds, no hysteresis
//! - No background tasks; each request performs exactly one pass
//! - OS access is injected so tests can run without a real worker

pub mod checker;
pub mod pidfile;
pub mod process;
pub mod status;

use async_trait::async_trait;

pub use checker::{Dependencies, ProxyChecker, SwappableCheck};
pub use pidfile::ProcessId;
pub use process::{FakeProcessTable, Liveness, OsProcessProbe, ProcessProbe};
pub use status::{StatusProbe, StatusProbeResult};

/// Error type carried across the generic check interface.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A named check that can be mounted on the healthz endpoint.
#[async_trait]
pub trait HealthzCheck: Send + Sync {
    /// URL-safe name, used in `/healthz/{name}` and in reports.
    fn name(&self) -> &str;

    /// Run the check once.
    async fn check(&self) -> Result<(), BoxError>;
}

/// Always passes; proves the health server itself is answering.
#[derive(Debug, Clone, Copy, Default)]
pub struct PingCheck;

#[async_trait]
impl HealthzCheck for PingCheck {
    fn name(&self) -> &str {
        "ping"
    }

    async fn check(&self) -> Result<(), BoxError> {
        Ok(())
    }
}
