//! Pid file reading.
//!
//! # Responsibilities
//! - Read the worker's pid file through the injected filesystem
//! - Parse its content into a [`ProcessId`]
//!
//! # Design Decisions
//! - One read per check, no retries and no caching
//! - Surrounding whitespace is ignored (daemons usually append '\n')
//! - Anything but plain ASCII digits is rejected, including '+' signs
//! - The read runs on the blocking pool under a deadline and is capped at
//!   [`MAX_PID_FILE_BYTES`], so a stalled mount or an endless file only
//!   fails the check

use std::fmt;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::{task, time};

use crate::error::HealthError;
use crate::fs::Filesystem;

/// Longest pid file content we accept. A pid needs at most 10 digits.
pub const MAX_PID_FILE_BYTES: usize = 64;

/// Identifier of the managed process, as recorded in its pid file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// Parse pid file content. Returns `None` if it is not a non-negative integer.
    pub fn parse(content: &str) -> Option<Self> {
        let trimmed = content.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        trimmed.parse().ok().map(ProcessId)
    }
}

impl From<u32> for ProcessId {
    fn from(pid: u32) -> Self {
        Self(pid)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read and parse the pid file at `path`, giving up after `timeout`.
pub async fn read_pid(
    filesystem: &Arc<dyn Filesystem>,
    path: &Path,
    timeout: Duration,
) -> Result<ProcessId, HealthError> {
    let unreadable = |source: io::Error| HealthError::PidFileUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let read = task::spawn_blocking({
        let filesystem = filesystem.clone();
        let path = path.to_path_buf();
        move || filesystem.read(&path, MAX_PID_FILE_BYTES as u64 + 1)
    });

    let raw = match time::timeout(timeout, read).await {
        Ok(Ok(Ok(raw))) => raw,
        Ok(Ok(Err(e))) if e.kind() == ErrorKind::NotFound => {
            return Err(HealthError::FileNotFound {
                path: path.to_path_buf(),
            })
        }
        Ok(Ok(Err(e))) => return Err(unreadable(e)),
        Ok(Err(e)) => return Err(unreadable(io::Error::other(e))),
        Err(_) => {
            return Err(unreadable(io::Error::new(
                ErrorKind::TimedOut,
                format!("read timed out after {}ms", timeout.as_millis()),
            )))
        }
    };

    if raw.len() > MAX_PID_FILE_BYTES {
        let mut content = String::from_utf8_lossy(&raw[..MAX_PID_FILE_BYTES]).into_owned();
        content.push_str("...");
        return Err(HealthError::Parse {
            path: path.to_path_buf(),
            content,
        });
    }

    let content = String::from_utf8_lossy(&raw);
    ProcessId::parse(&content).ok_or_else(|| HealthError::Parse {
        path: path.to_path_buf(),
        content: content.into_owned(),
    })
}
