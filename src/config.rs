//! Runtime configuration for the sealer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use docseal_crypto::{DEFAULT_EXTENSION, MAX_EXTENSION_LENGTH};

use crate::error::{Error, Result};

/// Largest plaintext accepted by default (50 MiB).
pub const DEFAULT_MAX_PLAINTEXT_BYTES: u64 = 50 * 1024 * 1024;

/// Largest PEM key file accepted by default (10 KiB).
pub const DEFAULT_MAX_KEY_FILE_BYTES: u64 = 10 * 1024;

// ============================================================================
// SealerConfig
// ============================================================================

/// Limits and naming used by [`crate::Sealer`].
///
/// Every field has a default, so a JSON file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SealerConfig {
    /// Reject plaintext files larger than this.
    pub max_plaintext_bytes: u64,
    /// Reject key files larger than this.
    pub max_key_file_bytes: u64,
    /// Require plaintext to start with the `%PDF` magic.
    pub require_pdf: bool,
    /// Extension tag used when the input file name has none.
    pub default_extension: String,
    /// File name for the provisioned public key.
    pub public_key_file_name: String,
    /// File name for the provisioned private key.
    pub private_key_file_name: String,
}

impl Default for SealerConfig {
    fn default() -> Self {
        Self {
            max_plaintext_bytes: DEFAULT_MAX_PLAINTEXT_BYTES,
            max_key_file_bytes: DEFAULT_MAX_KEY_FILE_BYTES,
            require_pdf: false,
            default_extension: DEFAULT_EXTENSION.to_string(),
            public_key_file_name: "public_key.pem".to_string(),
            private_key_file_name: "private_key.pem".to_string(),
        }
    }
}

impl SealerConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SealerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_plaintext_bytes == 0 {
            return Err(Error::Config("max_plaintext_bytes must be > 0".into()));
        }
        if self.max_key_file_bytes == 0 {
            return Err(Error::Config("max_key_file_bytes must be > 0".into()));
        }
        if !self.default_extension.starts_with('.') {
            return Err(Error::Config(format!(
                "default_extension must start with '.', got {:?}",
                self.default_extension
            )));
        }
        if self.default_extension.len() > MAX_EXTENSION_LENGTH {
            return Err(Error::Config(format!(
                "default_extension exceeds {} bytes",
                MAX_EXTENSION_LENGTH
            )));
        }
        for name in [&self.public_key_file_name, &self.private_key_file_name] {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(Error::Config(format!("invalid key file name {:?}", name)));
            }
        }
        if self.public_key_file_name == self.private_key_file_name {
            return Err(Error::Config(
                "public and private key file names must differ".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SealerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_plaintext_bytes, 52_428_800);
        assert_eq!(config.max_key_file_bytes, 10_240);
        assert_eq!(config.default_extension, ".pdf");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = SealerConfig::from_json_str(r#"{"require_pdf": true}"#).unwrap();
        assert!(config.require_pdf);
        assert_eq!(config.max_key_file_bytes, DEFAULT_MAX_KEY_FILE_BYTES);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(
            SealerConfig::from_json_str("{}").unwrap(),
            SealerConfig::default()
        );
    }

    #[test]
    fn rejects_zero_limits() {
        assert!(SealerConfig::from_json_str(r#"{"max_plaintext_bytes": 0}"#).is_err());
        assert!(SealerConfig::from_json_str(r#"{"max_key_file_bytes": 0}"#).is_err());
    }

    #[test]
    fn rejects_extension_without_dot() {
        let err = SealerConfig::from_json_str(r#"{"default_extension": "pdf"}"#).unwrap_err();
        assert!(err.to_string().contains("must start with '.'"));
    }

    #[test]
    fn rejects_path_like_key_names() {
        assert!(SealerConfig::from_json_str(r#"{"public_key_file_name": "../pub.pem"}"#).is_err());
        assert!(SealerConfig::from_json_str(
            r#"{"public_key_file_name": "k.pem", "private_key_file_name": "k.pem"}"#
        )
        .is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            SealerConfig::from_json_str("{not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docseal.json");
        std::fs::write(&path, r#"{"default_extension": ".docx"}"#).unwrap();
        let config = SealerConfig::load(&path).unwrap();
        assert_eq!(config.default_extension, ".docx");
        assert!(SealerConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
