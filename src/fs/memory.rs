//! In-memory `Filesystem` for tests.
//!
//! Clones share the same tree, so a test can keep one handle for staging
//! files while the checker reads through another.

use dashmap::{DashMap, DashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{FileHandle, Filesystem};

/// A thread-safe in-memory file tree.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    files: Arc<DashMap<PathBuf, Vec<u8>>>,
    dirs: Arc<DashSet<PathBuf>>,
}

impl MemoryFilesystem {
    /// Create an empty tree containing only the root directory.
    pub fn new() -> Self {
        let dirs = DashSet::new();
        dirs.insert(PathBuf::from("/"));
        Self {
            files: Arc::new(DashMap::new()),
            dirs: Arc::new(dirs),
        }
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.dirs.contains(parent),
            _ => true,
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if self.files.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a file", path.display()),
            ));
        }
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn FileHandle>> {
        if self.dirs.contains(path) {
            return Err(io::Error::other(format!("{} is a directory", path.display())));
        }
        if !self.parent_exists(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("parent directory of {} does not exist", path.display()),
            ));
        }
        self.files.insert(path.to_path_buf(), Vec::new());
        Ok(Box::new(MemoryFile {
            path: path.to_path_buf(),
            files: self.files.clone(),
        }))
    }

    fn read(&self, path: &Path, limit: u64) -> io::Result<Vec<u8>> {
        if self.dirs.contains(path) {
            return Err(io::Error::other(format!("{} is a directory", path.display())));
        }
        self.files
            .get(path)
            .map(|entry| {
                let content = entry.value();
                let end = content.len().min(usize::try_from(limit).unwrap_or(usize::MAX));
                content[..end].to_vec()
            })
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                )
            })
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                )
            })
    }
}

/// Write-through handle: bytes are visible to readers as soon as they land.
struct MemoryFile {
    path: PathBuf,
    files: Arc<DashMap<PathBuf, Vec<u8>>>,
}

impl FileHandle for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.files.get_mut(&self.path) {
            Some(mut entry) => {
                entry.value_mut().extend_from_slice(buf);
                Ok(buf.len())
            }
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} was removed while open", self.path.display()),
            )),
        }
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        Ok(())
    }
}
