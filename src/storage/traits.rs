//! Byte sources and sinks the sealer reads plaintext and keys from and
//! writes artifacts to.

use std::path::Path;

use crate::error::Result;

/// Storage collaborator for plaintext, key files, and sealed artifacts.
///
/// Implementations must make `write` all-or-nothing per path: a reader never
/// observes a partially written artifact.
pub trait ArtifactStore: Send + Sync {
    /// Read the whole file.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Size in bytes without reading the contents.
    fn size(&self, path: &Path) -> Result<u64>;

    /// Replace the file at `path` with `data`.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Move `from` to `to`, replacing `to` if it exists.
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove the file. Removing a missing file is not an error.
    fn remove(&self, path: &Path) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;
}
