//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the health service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthzConfig {
    /// Name of the managed worker; names the check and the default pid file.
    pub service: String,

    /// TCP port of the worker's loopback status endpoint.
    pub status_port: u16,

    /// Pid file written by the worker. Defaults to `/run/<service>.pid`.
    pub pid_file: Option<PathBuf>,

    /// Path requested on the status endpoint.
    pub status_path: String,

    /// Exact body the status endpoint must return.
    pub expected_body: String,

    /// Upper bound on one status probe (connect + response) in milliseconds.
    pub probe_timeout_ms: u64,

    /// Health server listener.
    pub listener: ListenerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl HealthzConfig {
    /// Pid file path with the service default applied.
    pub fn pid_file_path(&self) -> PathBuf {
        self.pid_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("/run/{}.pid", self.service)))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for HealthzConfig {
    fn default() -> Self {
        Self {
            service: "nginx".to_string(),
            status_port: 10246,
            pid_file: None,
            status_path: "/healthz".to_string(),
            expected_body: "ok".to_string(),
            probe_timeout_ms: 2000,
            listener: ListenerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration for the health endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:10254").
    pub bind_address: String,

    /// Deadline for a whole inbound request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:10254".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pid_file_defaults_to_service() {
        let mut config = HealthzConfig::default();
        assert_eq!(config.pid_file_path(), PathBuf::from("/run/nginx.pid"));

        config.service = "haproxy".into();
        assert_eq!(config.pid_file_path(), PathBuf::from("/run/haproxy.pid"));

        config.pid_file = Some("/var/run/custom.pid".into());
        assert_eq!(config.pid_file_path(), PathBuf::from("/var/run/custom.pid"));
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: HealthzConfig = toml::from_str("status_port = 18080").unwrap();
        assert_eq!(config.status_port, 18080);
        assert_eq!(config.status_path, "/healthz");
        assert_eq!(config.expected_body, "ok");
        assert_eq!(config.probe_timeout(), Duration::from_secs(2));
        assert_eq!(config.listener.bind_address, "0.0.0.0:10254");
    }
}
