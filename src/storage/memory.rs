//! In-memory artifact store, used by tests and embedders that never touch disk.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::{Error, Result};

use super::traits::ArtifactStore;

/// Path → bytes map behind a `parking_lot::Mutex`.
///
/// Paths listed with [`MemoryStore::fail_writes_to`] reject writes, which lets
/// callers exercise partial-failure handling.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    failing: Mutex<Vec<PathBuf>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    pub fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Vec<u8>>) {
        self.files.lock().insert(path.into(), data.into());
    }

    /// Make every later write to `path` fail.
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        self.failing.lock().push(path.into());
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.files.lock().keys().cloned().collect();
        paths.sort();
        paths
    }
}

fn not_found(path: &Path) -> Error {
    Error::io(path, io::Error::new(io::ErrorKind::NotFound, "no such file"))
}

impl ArtifactStore for MemoryStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    fn size(&self, path: &Path) -> Result<u64> {
        self.files
            .lock()
            .get(path)
            .map(|d| d.len() as u64)
            .ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        if self.failing.lock().iter().any(|p| p == path) {
            return Err(Error::io(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "write rejected"),
            ));
        }
        self.files.lock().insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut files = self.files.lock();
        let data = files.remove(from).ok_or_else(|| not_found(from))?;
        files.insert(to.to_path_buf(), data);
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        self.files.lock().remove(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }
}
