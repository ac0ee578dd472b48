//! File-access capability.
//!
//! # Data Flow
//! ```text
//! health::pidfile
//!     → Filesystem::read (injected)
//!         → OsFilesystem     (production, std::fs)
//!         → MemoryFilesystem (tests, in-memory map)
//! ```
//!
//! # Design Decisions
//! - The checker never calls std::fs directly; it only sees `dyn Filesystem`
//! - Writers go through `FileHandle` so tests can stage a pid file the same
//!   way the managed process does (create, write, close)
//! - Errors are plain `std::io::Error` so callers can match on `ErrorKind`
//! - Reads are bounded by the caller and only regular files are read, so a
//!   FIFO or device at the pid path cannot stall or flood the checker

pub mod memory;

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

pub use memory::MemoryFilesystem;

/// Narrow file-system interface used by the health checker and its tests.
pub trait Filesystem: Send + Sync {
    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create (or truncate) a file and return a writable handle.
    fn create(&self, path: &Path) -> io::Result<Box<dyn FileHandle>>;

    /// Read at most `limit` bytes from the start of a regular file.
    fn read(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// An open, writable file.
pub trait FileHandle: Send {
    /// Append bytes at the current position; returns the number written.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Flush and release the handle.
    fn close(self: Box<Self>) -> io::Result<()>;
}

/// `Filesystem` backed by the host OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        let file = File::create(path)?;
        Ok(Box::new(OsFile { file }))
    }

    fn read(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>> {
        // Opening a FIFO blocks until a writer shows up; refuse it before open.
        if !std::fs::metadata(path)?.is_file() {
            return Err(io::Error::other(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        let mut buf = Vec::new();
        File::open(path)?.take(limit).read_to_end(&mut buf)?;
        Ok(buf)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

struct OsFile {
    file: File,
}

impl FileHandle for OsFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write_all(&mut self.file, buf)?;
        Ok(buf.len())
    }

    fn close(mut self: Box<Self>) -> io::Result<()> {
        io::Write::flush(&mut self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_filesystem_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let fs = OsFilesystem;
        let run = dir.path().join("run");
        fs.create_dir_all(&run).unwrap();

        let path = run.join("nginx.pid");
        let mut file = fs.create(&path).unwrap();
        assert_eq!(file.write(b"4242").unwrap(), 4);
        file.close().unwrap();

        assert_eq!(fs.read(&path, 64).unwrap(), b"4242");
        assert_eq!(fs.read(&path, 2).unwrap(), b"42");

        fs.remove_file(&path).unwrap();
        let err = fs.read(&path, 64).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_os_filesystem_refuses_non_regular_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = OsFilesystem.read(dir.path(), 64).unwrap_err();
        assert_ne!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_os_filesystem_does_not_block_on_fifo() {
        let dir = tempfile::tempdir().unwrap();
        let fifo = dir.path().join("nginx.pid");
        let status = std::process::Command::new("mkfifo")
            .arg(&fifo)
            .status()
            .unwrap();
        assert!(status.success());

        // Returns at once instead of waiting for a writer.
        let err = OsFilesystem.read(&fifo, 64).unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
    }

    #[cfg(unix)]
    #[test]
    fn test_os_filesystem_refuses_devices() {
        let err = OsFilesystem.read(Path::new("/dev/zero"), 64).unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
    }
}
