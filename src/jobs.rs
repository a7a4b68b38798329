//! Registry of seal requests and their outcome.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One seal request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionJob {
    pub id: u64,
    pub file_name: String,
    pub file_size: u64,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// Failure message for `Failed` jobs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// JobRegistry
// ============================================================================

/// Thread-safe, in-memory job registry. Ids are sequential starting at 1.
#[derive(Debug)]
pub struct JobRegistry {
    next_id: AtomicU64,
    jobs: RwLock<HashMap<u64, EncryptionJob>>,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            jobs: RwLock::new(HashMap::new()),
        }
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new job and return a snapshot of it.
    pub fn create(&self, file_name: &str, file_size: u64, status: JobStatus) -> EncryptionJob {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let job = EncryptionJob {
            id,
            file_name: file_name.to_string(),
            file_size,
            status,
            created_at: Utc::now(),
            error: None,
        };
        self.jobs.write().insert(id, job.clone());
        job
    }

    pub fn get(&self, id: u64) -> Option<EncryptionJob> {
        self.jobs.read().get(&id).cloned()
    }

    /// Set a job's status. Returns the updated job, or `None` if unknown.
    pub fn update_status(&self, id: u64, status: JobStatus) -> Option<EncryptionJob> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&id)?;
        job.status = status;
        Some(job.clone())
    }

    /// Mark a job failed with a message.
    pub fn fail(&self, id: u64, message: impl Into<String>) -> Option<EncryptionJob> {
        let mut jobs = self.jobs.write();
        let job = jobs.get_mut(&id)?;
        job.status = JobStatus::Failed;
        job.error = Some(message.into());
        Some(job.clone())
    }

    /// All jobs, newest first (ties broken by higher id).
    pub fn list(&self) -> Vec<EncryptionJob> {
        let mut jobs: Vec<_> = self.jobs.read().values().cloned().collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn ids_are_sequential_from_one() {
        let registry = JobRegistry::new();
        let a = registry.create("a.pdf", 10, JobStatus::Pending);
        let b = registry.create("b.pdf", 20, JobStatus::Processing);
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn update_and_get() {
        let registry = JobRegistry::new();
        let job = registry.create("a.pdf", 10, JobStatus::Processing);
        let updated = registry.update_status(job.id, JobStatus::Completed).unwrap();
        assert_eq!(updated.status, JobStatus::Completed);
        assert_eq!(registry.get(job.id).unwrap().status, JobStatus::Completed);
    }

    #[test]
    fn update_missing_returns_none() {
        let registry = JobRegistry::new();
        assert!(registry.update_status(42, JobStatus::Completed).is_none());
        assert!(registry.fail(42, "boom").is_none());
        assert!(registry.get(42).is_none());
    }

    #[test]
    fn fail_records_message() {
        let registry = JobRegistry::new();
        let job = registry.create("a.pdf", 10, JobStatus::Processing);
        let failed = registry.fail(job.id, "bad key").unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("bad key"));
        assert!(failed.status.is_terminal());
    }

    #[test]
    fn list_is_newest_first() {
        let registry = JobRegistry::new();
        for i in 0..5 {
            registry.create(&format!("{}.pdf", i), i, JobStatus::Pending);
        }
        let ids: Vec<u64> = registry.list().iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&JobStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }

    #[test]
    fn concurrent_creates_get_unique_ids() {
        let registry = Arc::new(JobRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..25)
                        .map(|_| registry.create("x", 1, JobStatus::Pending).id)
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        assert!(registry.get(200).is_some());
    }
}
