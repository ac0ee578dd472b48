//! Liveness checking for a reverse-proxy worker.
//!
//! A worker is healthy when its pid file names a running process and its
//! loopback status endpoint answers `200 ok`. The verdict is served on
//! `GET /healthz` for process supervisors and orchestrators.

pub mod config;
pub mod error;
pub mod fs;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::HealthzConfig;
pub use error::HealthError;
pub use health::{Dependencies, ProxyChecker, SwappableCheck};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
