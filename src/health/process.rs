//! Process existence checks.
//!
//! # Responsibilities
//! - Answer "is pid P alive right now?" without touching the process
//! - Separate "definitely gone" from "could not tell"
//!
//! # Design Decisions
//! - Production uses the null signal: `kill(pid, 0)` performs the permission
//!   and existence checks but delivers nothing
//! - EPERM means the process exists but belongs to someone else; that is
//!   still inconclusive, and inconclusive is unhealthy
//! - pid 0 and pids beyond `pid_t` never name a single process

use dashmap::DashSet;
use std::sync::Arc;

use crate::error::HealthError;
use crate::health::pidfile::ProcessId;

/// Result of a single existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    NotFound,
    Inconclusive(String),
}

/// Injected process-introspection capability.
pub trait ProcessProbe: Send + Sync {
    /// Check whether `pid` currently refers to a live process.
    fn liveness(&self, pid: ProcessId) -> Liveness;
}

/// Map a probe answer onto the check outcome.
pub fn ensure_running(probe: &dyn ProcessProbe, pid: ProcessId) -> Result<(), HealthError> {
    match probe.liveness(pid) {
        Liveness::Alive => Ok(()),
        Liveness::NotFound => Err(HealthError::ProcessNotFound { pid: pid.0 }),
        Liveness::Inconclusive(reason) => Err(HealthError::ProbeInconclusive { pid: pid.0, reason }),
    }
}

/// Process probe backed by the host kernel.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsProcessProbe;

#[cfg(unix)]
impl ProcessProbe for OsProcessProbe {
    fn liveness(&self, pid: ProcessId) -> Liveness {
        use nix::errno::Errno;
        use nix::sys::signal;
        use nix::unistd::Pid;

        let raw = match i32::try_from(pid.0) {
            Ok(raw) if raw > 0 => raw,
            _ => return Liveness::NotFound,
        };

        match signal::kill(Pid::from_raw(raw), None) {
            Ok(()) => Liveness::Alive,
            Err(Errno::ESRCH) => Liveness::NotFound,
            Err(Errno::EPERM) => Liveness::Inconclusive("permission denied".to_string()),
            Err(e) => Liveness::Inconclusive(e.to_string()),
        }
    }
}

#[cfg(not(unix))]
impl ProcessProbe for OsProcessProbe {
    fn liveness(&self, _pid: ProcessId) -> Liveness {
        Liveness::Inconclusive("process probing is not supported on this platform".to_string())
    }
}

/// In-memory process table for tests.
///
/// Clones share state, so a test can keep a handle and "kill" or "restart"
/// processes while the checker holds another.
#[derive(Debug, Clone, Default)]
pub struct FakeProcessTable {
    live: Arc<DashSet<u32>>,
    denied: Arc<DashSet<u32>>,
}

impl FakeProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `pid` as running.
    pub fn start(&self, pid: u32) {
        self.live.insert(pid);
    }

    /// Mark `pid` as gone.
    pub fn stop(&self, pid: u32) {
        self.live.remove(&pid);
    }

    /// Make probes of `pid` answer "permission denied".
    pub fn deny(&self, pid: u32) {
        self.denied.insert(pid);
    }
}

impl ProcessProbe for FakeProcessTable {
    fn liveness(&self, pid: ProcessId) -> Liveness {
        if self.denied.contains(&pid.0) {
            Liveness::Inconclusive("permission denied".to_string())
        } else if self.live.contains(&pid.0) {
            Liveness::Alive
        } else {
            Liveness::NotFound
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_table_states() {
        let table = FakeProcessTable::new();
        assert_eq!(table.liveness(ProcessId(10)), Liveness::NotFound);

        table.start(10);
        assert_eq!(table.liveness(ProcessId(10)), Liveness::Alive);

        table.stop(10);
        assert_eq!(table.liveness(ProcessId(10)), Liveness::NotFound);

        table.start(11);
        table.deny(11);
        assert!(matches!(table.liveness(ProcessId(11)), Liveness::Inconclusive(_)));
    }

    #[test]
    fn test_ensure_running_maps_errors() {
        let table = FakeProcessTable::new();
        table.start(1);
        table.deny(2);

        assert!(ensure_running(&table, ProcessId(1)).is_ok());
        assert!(matches!(
            ensure_running(&table, ProcessId(2)),
            Err(HealthError::ProbeInconclusive { pid: 2, .. })
        ));
        assert!(matches!(
            ensure_running(&table, ProcessId(3)),
            Err(HealthError::ProcessNotFound { pid: 3 })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_os_probe_sees_own_process() {
        let probe = OsProcessProbe;
        assert_eq!(probe.liveness(ProcessId(std::process::id())), Liveness::Alive);
    }

    #[cfg(unix)]
    #[test]
    fn test_os_probe_rejects_group_and_out_of_range_pids() {
        let probe = OsProcessProbe;
        assert_eq!(probe.liveness(ProcessId(0)), Liveness::NotFound);
        assert_eq!(probe.liveness(ProcessId(u32::MAX)), Liveness::NotFound);
        // Above the kernel's pid_max ceiling (2^22).
        assert_eq!(probe.liveness(ProcessId(99_999_999)), Liveness::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_os_probe_after_child_exits() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = ProcessId(child.id());
        child.wait().unwrap();
        assert_eq!(OsProcessProbe.liveness(pid), Liveness::NotFound);
    }
}
