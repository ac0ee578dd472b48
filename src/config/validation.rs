//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, timeouts, paths)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HealthzConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::HealthzConfig;

/// Longest status probe we accept; a liveness probe must answer quickly.
pub const MAX_PROBE_TIMEOUT_MS: u64 = 2000;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("status_port must be between 1 and 65535")]
    StatusPortZero,

    #[error("probe_timeout_ms must be between 1 and {max}, got {0}", max = MAX_PROBE_TIMEOUT_MS)]
    ProbeTimeout(u64),

    #[error("status_path must start with '/', got {0:?}")]
    StatusPath(String),

    #[error("service must not be empty when pid_file is unset")]
    EmptyService,

    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("listener.request_timeout_secs must be greater than 0")]
    RequestTimeout,
}

/// Check a parsed configuration, collecting every error.
pub fn validate_config(config: &HealthzConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.status_port == 0 {
        errors.push(ValidationError::StatusPortZero);
    }
    if config.probe_timeout_ms == 0 || config.probe_timeout_ms > MAX_PROBE_TIMEOUT_MS {
        errors.push(ValidationError::ProbeTimeout(config.probe_timeout_ms));
    }
    if !config.status_path.starts_with('/') {
        errors.push(ValidationError::StatusPath(config.status_path.clone()));
    }
    if config.pid_file.is_none() && config.service.trim().is_empty() {
        errors.push(ValidationError::EmptyService);
    }
    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&HealthzConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = HealthzConfig::default();
        config.status_port = 0;
        config.probe_timeout_ms = 5000;
        config.status_path = "healthz".into();
        config.listener.bind_address = "localhost".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::StatusPortZero,
                ValidationError::ProbeTimeout(5000),
                ValidationError::StatusPath("healthz".into()),
                ValidationError::BindAddress("localhost".into()),
            ]
        );
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = HealthzConfig::default();
        config.probe_timeout_ms = 0;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::ProbeTimeout(0)])
        );
    }

    #[test]
    fn test_empty_service_only_matters_without_pid_file() {
        let mut config = HealthzConfig::default();
        config.service = "  ".into();
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::EmptyService])
        );

        config.pid_file = Some("/run/worker.pid".into());
        assert_eq!(validate_config(&config), Ok(()));
    }
}
