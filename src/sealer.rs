//! Seal/open orchestration over an [`ArtifactStore`].
//!
//! Holds only session state (config, store, job registry). Every cryptographic
//! value lives inside a single call and is zeroized or dropped before it returns.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};
use zeroize::Zeroize;

use docseal_crypto::{
    decrypt, encrypt, parse_private_key_pem, parse_public_key_pem, KeyPair, PlaintextRecord,
    PublicKeyParts, RsaPublicKey, SealError, SealedArtifacts, BLOCK_SIZE, CBC_IV_LENGTH,
    EXTENSION_LENGTH_PREFIX, MAX_EXTENSION_LENGTH, RSA_KEY_BITS,
};

use crate::config::SealerConfig;
use crate::error::{Error, Result};
use crate::jobs::{EncryptionJob, JobRegistry, JobStatus};
use crate::naming::{artifact_paths, restored_path, ArtifactPaths};
use crate::storage::{ArtifactStore, FsStore};
use crate::validate::{check_restorable_extension, check_size, extension_for, looks_like_pdf};

/// Envelope bytes beyond the padded plaintext: length prefix, longest extension,
/// IV, and one padding block.
const MAX_ENVELOPE_OVERHEAD: u64 =
    (EXTENSION_LENGTH_PREFIX + MAX_EXTENSION_LENGTH + CBC_IV_LENGTH + BLOCK_SIZE) as u64;

static BACKUP_SEQ: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// Requests and outcomes
// ============================================================================

/// Seal one plaintext file for the holder of `public_key`.
#[derive(Debug, Clone)]
pub struct SealRequest {
    pub plaintext: PathBuf,
    pub public_key: PathBuf,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealOutcome {
    pub job_id: u64,
    pub extension: String,
    pub paths: ArtifactPaths,
    pub envelope_len: usize,
    pub wrapped_key_len: usize,
}

/// Recover a plaintext from its `.enc`/`.key` pair.
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub envelope: PathBuf,
    pub wrapped_key: PathBuf,
    pub private_key: PathBuf,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOutcome {
    pub extension: String,
    pub path: PathBuf,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedKeys {
    pub public_key: PathBuf,
    pub private_key: PathBuf,
    pub bits: usize,
}

/// Per-file result of [`Sealer::seal_batch`].
#[derive(Debug)]
pub struct BatchItem {
    pub plaintext: PathBuf,
    pub result: Result<SealOutcome>,
}

// ============================================================================
// Sealer
// ============================================================================

/// Entry point for the file-level operations.
///
/// Cheap to clone; clones share the store and the job registry.
pub struct Sealer<S: ArtifactStore = FsStore> {
    store: Arc<S>,
    config: Arc<SealerConfig>,
    jobs: Arc<JobRegistry>,
}

impl<S: ArtifactStore> Clone for Sealer<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
            jobs: Arc::clone(&self.jobs),
        }
    }
}

impl Sealer<FsStore> {
    /// Sealer over the local filesystem.
    pub fn with_filesystem(config: SealerConfig) -> Result<Self> {
        Self::new(FsStore::new(), config)
    }
}

impl<S: ArtifactStore + 'static> Sealer<S> {
    pub fn new(store: S, config: SealerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: Arc::new(store),
            config: Arc::new(config),
            jobs: Arc::new(JobRegistry::new()),
        })
    }

    pub fn config(&self) -> &SealerConfig {
        &self.config
    }

    pub fn jobs(&self) -> &JobRegistry {
        &self.jobs
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Look up a recorded seal job.
    pub fn job(&self, id: u64) -> Result<EncryptionJob> {
        self.jobs.get(id).ok_or(Error::JobNotFound(id))
    }

    // ------------------------------------------------------------------------
    // Key provisioning
    // ------------------------------------------------------------------------

    /// Generate a key pair and write both PEM files into `out_dir`.
    ///
    /// # Arguments
    /// * `out_dir` - Directory receiving the configured public/private file names
    /// * `bits` - Modulus size; `None` means 2048
    pub fn provision_keys(&self, out_dir: &Path, bits: Option<usize>) -> Result<ProvisionedKeys> {
        let pair = KeyPair::generate_with_bits(bits.unwrap_or(RSA_KEY_BITS))?;
        let public_pem = pair.public_key_pem()?;
        let private_pem = pair.private_key_pem()?;

        let public_path = out_dir.join(&self.config.public_key_file_name);
        let private_path = out_dir.join(&self.config.private_key_file_name);
        self.write_pair(
            (public_path.as_path(), public_pem.as_bytes()),
            (private_path.as_path(), private_pem.as_bytes()),
        )?;

        info!(
            bits = pair.bits(),
            public_key = %public_path.display(),
            "provisioned key pair"
        );
        Ok(ProvisionedKeys {
            public_key: public_path,
            private_key: private_path,
            bits: pair.bits(),
        })
    }

    // ------------------------------------------------------------------------
    // Seal
    // ------------------------------------------------------------------------

    /// Validate inputs, encrypt, and write the `.enc`/`.key` pair.
    ///
    /// A job is recorded once the plaintext is found; it ends `Completed` or
    /// `Failed`. On failure no artifact from this call is left behind.
    pub fn seal_file(&self, request: &SealRequest) -> Result<SealOutcome> {
        let file_size = self.store.size(&request.plaintext)?;
        let file_name = request
            .plaintext
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let job = self.jobs.create(&file_name, file_size, JobStatus::Pending);
        match self.seal_inner(request, file_size, job.id) {
            Ok(outcome) => {
                self.jobs.update_status(job.id, JobStatus::Completed);
                info!(
                    job_id = job.id,
                    file = %request.plaintext.display(),
                    envelope = %outcome.paths.envelope.display(),
                    "sealed file"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.jobs.fail(job.id, e.to_string());
                warn!(job_id = job.id, file = %request.plaintext.display(), error = %e, "seal failed");
                Err(e)
            }
        }
    }

    fn seal_inner(&self, request: &SealRequest, file_size: u64, job_id: u64) -> Result<SealOutcome> {
        check_size("plaintext", file_size, self.config.max_plaintext_bytes)?;
        let recipient = self.load_public_key(&request.public_key)?;
        let paths = artifact_paths(&request.plaintext, &request.out_dir)?;

        let mut data = self.store.read(&request.plaintext)?;
        // Re-check: the file may have grown since `size` was taken.
        check_size("plaintext", data.len() as u64, self.config.max_plaintext_bytes)?;
        if self.config.require_pdf && !looks_like_pdf(&data) {
            data.zeroize();
            return Err(Error::Validation(format!(
                "{} is not a PDF",
                request.plaintext.display()
            )));
        }

        self.jobs.update_status(job_id, JobStatus::Processing);
        let extension = extension_for(&request.plaintext, &self.config.default_extension);
        let mut record = PlaintextRecord::new(extension, data);
        let sealed = encrypt(&record, &recipient);
        record.data.zeroize();
        let SealedArtifacts {
            envelope,
            wrapped_key,
        } = sealed?;

        debug!(
            job_id,
            plaintext_len = file_size,
            envelope_len = envelope.len(),
            wrapped_key_len = wrapped_key.len(),
            "encrypted"
        );
        self.write_pair(
            (paths.envelope.as_path(), envelope.as_slice()),
            (paths.wrapped_key.as_path(), wrapped_key.as_slice()),
        )?;

        Ok(SealOutcome {
            job_id,
            extension: record.extension,
            paths,
            envelope_len: envelope.len(),
            wrapped_key_len: wrapped_key.len(),
        })
    }

    /// Seal many files for one recipient concurrently on the blocking pool.
    ///
    /// Each file is independent: one failure does not affect the others.
    /// Results come back in input order. A file whose artifacts would land on
    /// the same paths as an earlier file in the batch is rejected without
    /// being sealed.
    pub async fn seal_batch(
        &self,
        plaintexts: Vec<PathBuf>,
        public_key: &Path,
        out_dir: &Path,
    ) -> Vec<BatchItem> {
        let mut claimed = HashSet::new();
        let handles: Vec<_> = plaintexts
            .into_iter()
            .map(|plaintext| {
                if let Ok(paths) = artifact_paths(&plaintext, out_dir) {
                    if !claimed.insert(paths.envelope) {
                        let err = Error::Validation(format!(
                            "{} would overwrite the artifacts of an earlier file in this batch",
                            plaintext.display()
                        ));
                        return (plaintext, Err(err));
                    }
                }
                let sealer = self.clone();
                let request = SealRequest {
                    plaintext: plaintext.clone(),
                    public_key: public_key.to_path_buf(),
                    out_dir: out_dir.to_path_buf(),
                };
                let handle = tokio::task::spawn_blocking(move || sealer.seal_file(&request));
                (plaintext, Ok(handle))
            })
            .collect();

        let mut items = Vec::with_capacity(handles.len());
        for (plaintext, handle) in handles {
            let result = match handle {
                Ok(handle) => match handle.await {
                    Ok(result) => result,
                    Err(e) => Err(Error::Task(e.to_string())),
                },
                Err(rejected) => Err(rejected),
            };
            items.push(BatchItem { plaintext, result });
        }

        let failed = items.iter().filter(|i| i.result.is_err()).count();
        info!(total = items.len(), failed, "batch finished");
        items
    }

    // ------------------------------------------------------------------------
    // Open
    // ------------------------------------------------------------------------

    /// Decrypt a `.enc`/`.key` pair and write the restored file into `out_dir`.
    pub fn open_file(&self, request: &OpenRequest) -> Result<OpenOutcome> {
        let private_size = self.store.size(&request.private_key)?;
        check_size("private key", private_size, self.config.max_key_file_bytes)?;
        let mut private_pem = self.store.read(&request.private_key)?;
        let recipient = parse_private_key_pem(&private_pem);
        private_pem.zeroize();
        let recipient = recipient?;

        let envelope_size = self.store.size(&request.envelope)?;
        check_size(
            "envelope",
            envelope_size,
            self.config
                .max_plaintext_bytes
                .saturating_add(MAX_ENVELOPE_OVERHEAD),
        )?;
        let wrapped_size = self.store.size(&request.wrapped_key)?;
        if wrapped_size != recipient.size() as u64 {
            return Err(SealError::Unwrap(format!(
                "wrapped key file is {} bytes, recipient modulus is {}",
                wrapped_size,
                recipient.size()
            ))
            .into());
        }

        let envelope = self.store.read(&request.envelope)?;
        let wrapped_key = self.store.read(&request.wrapped_key)?;
        let mut record = decrypt(&envelope, &wrapped_key, &recipient)?;

        let written = check_restorable_extension(&record.extension)
            .and_then(|_| restored_path(&request.envelope, &record.extension, &request.out_dir))
            .and_then(|path| {
                self.store.write(&path, &record.data)?;
                Ok(path)
            });
        let len = record.data.len();
        record.data.zeroize();
        let path = written?;

        info!(
            envelope = %request.envelope.display(),
            restored = %path.display(),
            "opened file"
        );
        Ok(OpenOutcome {
            extension: record.extension,
            path,
            len,
        })
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn load_public_key(&self, path: &Path) -> Result<RsaPublicKey> {
        let size = self.store.size(path)?;
        check_size("public key", size, self.config.max_key_file_bytes)?;
        let pem = self.store.read(path)?;
        Ok(parse_public_key_pem(&pem)?)
    }

    /// Write two files that only make sense together.
    ///
    /// Existing files at either path are moved aside first. If any step
    /// fails, whatever was written is removed and the previous files are
    /// moved back, so the pair on disk is either entirely new or entirely old.
    fn write_pair<'a>(
        &self,
        first: (&'a Path, &'a [u8]),
        second: (&'a Path, &'a [u8]),
    ) -> Result<()> {
        let seq = BACKUP_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut backups = Vec::new();
        let mut written = Vec::new();

        match self.replace_pair([first, second], seq, &mut backups, &mut written) {
            Ok(()) => {
                for (_, backup) in &backups {
                    if let Err(e) = self.store.remove(backup) {
                        warn!(path = %backup.display(), error = %e, "stale backup left behind");
                    }
                }
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "artifact write failed, restoring previous files");
                for path in written {
                    if let Err(cleanup) = self.store.remove(path) {
                        warn!(path = %path.display(), error = %cleanup, "rollback failed");
                    }
                }
                for (target, backup) in backups {
                    if let Err(restore) = self.store.rename(&backup, target) {
                        warn!(
                            path = %target.display(),
                            backup = %backup.display(),
                            error = %restore,
                            "could not restore previous file"
                        );
                    }
                }
                Err(e)
            }
        }
    }

    fn replace_pair<'a>(
        &self,
        pair: [(&'a Path, &'a [u8]); 2],
        seq: u64,
        backups: &mut Vec<(&'a Path, PathBuf)>,
        written: &mut Vec<&'a Path>,
    ) -> Result<()> {
        for (target, _) in pair {
            if self.store.exists(target) {
                let backup = backup_path(target, seq);
                self.store.rename(target, &backup)?;
                backups.push((target, backup));
            }
        }
        for (target, data) in pair {
            self.store.write(target, data)?;
            written.push(target);
        }
        Ok(())
    }
}

/// Hidden sibling that holds a previous artifact while its replacement is written.
fn backup_path(path: &Path, seq: u64) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.prev-{}-{}", name, std::process::id(), seq))
}
