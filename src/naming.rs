//! Artifact file naming.
//!
//! Sealing `report.pdf` into `out/` produces `out/report.pdf.enc` and
//! `out/report.pdf.key`. Opening `report.pdf.enc` restores `report.pdf`.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Suffix of the ciphertext envelope artifact.
pub const ENVELOPE_SUFFIX: &str = ".enc";

/// Suffix of the wrapped key artifact.
pub const WRAPPED_KEY_SUFFIX: &str = ".key";

/// Output locations of one sealed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub envelope: PathBuf,
    pub wrapped_key: PathBuf,
}

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| Error::Validation(format!("{} has no usable file name", path.display())))
}

/// Sibling artifact paths for a plaintext file, placed in `out_dir`.
pub fn artifact_paths(plaintext: &Path, out_dir: &Path) -> Result<ArtifactPaths> {
    let name = file_name(plaintext)?;
    Ok(ArtifactPaths {
        envelope: out_dir.join(format!("{}{}", name, ENVELOPE_SUFFIX)),
        wrapped_key: out_dir.join(format!("{}{}", name, WRAPPED_KEY_SUFFIX)),
    })
}

/// Path for a restored plaintext.
///
/// Strips `.enc` from the envelope's file name, then appends `extension`
/// unless the remaining name already ends with it.
pub fn restored_path(envelope: &Path, extension: &str, out_dir: &Path) -> Result<PathBuf> {
    let name = file_name(envelope)?;
    let base = name.strip_suffix(ENVELOPE_SUFFIX).unwrap_or(name);
    let restored = if base.is_empty() || !base.ends_with(extension) {
        format!("{}{}", base, extension)
    } else {
        base.to_string()
    };
    if restored.is_empty() || restored == "." || restored == ".." {
        return Err(Error::Validation(format!(
            "cannot derive an output name from {}",
            envelope.display()
        )));
    }
    Ok(out_dir.join(restored))
}
