//! Filesystem-backed artifact store with atomic writes.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

use super::traits::ArtifactStore;

/// Reads and writes real files. Each write goes to a uniquely named temporary
/// file in the target directory and is persisted over the target by rename.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

impl ArtifactStore for FsStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| Error::io(path, e))
    }

    fn size(&self, path: &Path) -> Result<u64> {
        fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| Error::io(path, e))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(parent_dir(path)).map_err(|e| Error::io(path, e))?;
        tmp.write_all(data).map_err(|e| Error::io(path, e))?;
        tmp.as_file().sync_all().map_err(|e| Error::io(path, e))?;
        tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).map_err(|e| Error::io(from, e))
    }

    fn remove(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        let store = FsStore::new();
        store.write(&path, b"hello").unwrap();
        assert!(store.exists(&path));
        assert_eq!(store.read(&path).unwrap(), b"hello");
        assert_eq!(store.size(&path).unwrap(), 5);
    }

    #[test]
    fn write_replaces_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bin");
        let store = FsStore::new();
        store.write(&path, b"first").unwrap();
        store.write(&path, b"second").unwrap();
        assert_eq!(store.read(&path).unwrap(), b"second");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("a.bin");
        let err = FsStore::new().write(&path, b"x").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn concurrent_writes_to_one_path_never_mix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.enc");
        let payloads: Vec<Vec<u8>> = (0..8u8).map(|i| vec![i; 256 * 1024]).collect();

        std::thread::scope(|scope| {
            for payload in &payloads {
                let path = &path;
                scope.spawn(move || FsStore::new().write(path, payload).unwrap());
            }
        });

        let data = FsStore::new().read(&path).unwrap();
        assert!(payloads.contains(&data));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn rename_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("a.enc");
        let to = dir.path().join("b.enc");
        let store = FsStore::new();
        store.write(&from, b"new").unwrap();
        store.write(&to, b"old").unwrap();
        store.rename(&from, &to).unwrap();
        assert!(!store.exists(&from));
        assert_eq!(store.read(&to).unwrap(), b"new");
    }

    #[test]
    fn remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FsStore::new().remove(&dir.path().join("gone")).is_ok());
    }

    #[test]
    fn read_missing_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pdf");
        let err = FsStore::new().read(&path).unwrap_err();
        assert!(err.to_string().contains("missing.pdf"));
    }
}
