//! Input checks run before any cryptographic work.

use std::path::Path;

use docseal_crypto::MAX_EXTENSION_LENGTH;

use crate::error::{Error, Result};

/// Magic bytes at the start of every PDF.
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// True if the bytes start with the PDF magic.
pub fn looks_like_pdf(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}

/// Reject `size` if it exceeds `limit`.
pub fn check_size(what: &str, size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(Error::Validation(format!(
            "{} is {} bytes, limit is {}",
            what, size, limit
        )));
    }
    Ok(())
}

/// Extension tag for a plaintext path: the last `.xxx` of the file name, or
/// `default` when there is none.
///
/// `report.pdf` → `.pdf`, `archive.tar.gz` → `.gz`, `README` → `default`.
pub fn extension_for(path: &Path, default: &str) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() && ext.len() < MAX_EXTENSION_LENGTH => format!(".{}", ext),
        _ => default.to_string(),
    }
}

/// Reject extension tags that cannot be used as part of a file name.
///
/// The tag comes from the envelope, which is unauthenticated, so it is
/// treated as untrusted input.
pub fn check_restorable_extension(extension: &str) -> Result<()> {
    if extension.contains(['/', '\\', '\0']) {
        return Err(Error::Validation(format!(
            "envelope extension {:?} contains path characters",
            extension
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_magic() {
        assert!(looks_like_pdf(b"%PDF-1.7\n..."));
        assert!(!looks_like_pdf(b"%PD"));
        assert!(!looks_like_pdf(b"PK\x03\x04"));
        assert!(!looks_like_pdf(b""));
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(check_size("file", 10, 10).is_ok());
        let err = check_size("file", 11, 10).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("11 bytes"));
    }

    #[test]
    fn extension_from_path() {
        assert_eq!(extension_for(Path::new("/tmp/report.pdf"), ".bin"), ".pdf");
        assert_eq!(extension_for(Path::new("archive.tar.gz"), ".bin"), ".gz");
        assert_eq!(extension_for(Path::new("README"), ".pdf"), ".pdf");
        assert_eq!(extension_for(Path::new(".hidden"), ".pdf"), ".pdf");
    }

    #[test]
    fn restorable_extension() {
        assert!(check_restorable_extension(".pdf").is_ok());
        assert!(check_restorable_extension("").is_ok());
        assert!(check_restorable_extension("/../../etc/passwd").is_err());
        assert!(check_restorable_extension(".a\\b").is_err());
        assert!(check_restorable_extension(".a\0").is_err());
    }
}
