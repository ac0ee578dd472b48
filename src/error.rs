//! Failure taxonomy for health checks.
//!
//! Every stage of a check reports through [`HealthError`]. The endpoint
//! adapter collapses them all to "unhealthy" but keeps the `Display` text in
//! the response body, so each message names the stage and the offending
//! value.

use std::path::PathBuf;
use thiserror::Error;

/// Why a health check did not pass.
#[derive(Debug, Error)]
pub enum HealthError {
    /// The pid file does not exist.
    #[error("pid file {} not found", .path.display())]
    FileNotFound { path: PathBuf },

    /// The pid file exists but could not be read.
    #[error("pid file {} could not be read: {source}", .path.display())]
    PidFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The pid file content is not a non-negative integer.
    #[error("pid file {} does not contain a valid pid: {content:?}", .path.display())]
    Parse { path: PathBuf, content: String },

    /// No process with this pid exists.
    #[error("process {pid} is not running")]
    ProcessNotFound { pid: u32 },

    /// The existence check could not give a definite answer.
    #[error("process {pid} liveness is inconclusive: {reason}")]
    ProbeInconclusive { pid: u32, reason: String },

    /// The status endpoint refused, timed out or could not be reached.
    #[error("status endpoint {url} unreachable: {reason}")]
    EndpointUnreachable { url: String, reason: String },

    /// The status endpoint answered with the wrong status or body.
    #[error("status endpoint {url} returned unexpected response: status {status}, body {body:?}")]
    UnexpectedResponse { url: String, status: u16, body: String },
}

impl HealthError {
    /// Short stage label used in structured logs.
    pub fn stage(&self) -> &'static str {
        match self {
            HealthError::FileNotFound { .. }
            | HealthError::PidFileUnreadable { .. }
            | HealthError::Parse { .. } => "pid_file",
            HealthError::ProcessNotFound { .. } | HealthError::ProbeInconclusive { .. } => "process",
            HealthError::EndpointUnreachable { .. } | HealthError::UnexpectedResponse { .. } => "status_endpoint",
        }
    }
}
