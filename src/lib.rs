//! File sealing on top of `docseal-crypto`.
//!
//! Reads plaintext and PEM keys through an [`ArtifactStore`], validates them,
//! produces sibling `.enc`/`.key` artifacts, and restores plaintexts from them.
//! Cryptographic state never outlives a single call.

pub mod config;
pub mod error;
pub mod jobs;
pub mod naming;
pub mod sealer;
pub mod storage;
pub mod validate;

pub use config::SealerConfig;
pub use error::{Error, Result};
pub use jobs::{EncryptionJob, JobRegistry, JobStatus};
pub use naming::{artifact_paths, restored_path, ArtifactPaths, ENVELOPE_SUFFIX, WRAPPED_KEY_SUFFIX};
pub use sealer::{
    BatchItem, OpenOutcome, OpenRequest, ProvisionedKeys, SealOutcome, SealRequest, Sealer,
};
pub use storage::{ArtifactStore, FsStore, MemoryStore};
