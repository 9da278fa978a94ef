//! Collaborator seams between the orchestrator and its harvesters, storage,
//! and notification channel.
//!
//! Harvesters absorb their own failures: `harvest` returns whatever items the
//! source yielded, empty on an unrecoverable or disabled source. Only storage
//! surfaces errors to the orchestrator, because a failed persist is the one
//! condition that fails a run.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::digest::{DigestBrief, DigestRecord, RepoItem, VideoItem};
use crate::keywords::KeywordSet;
use crate::run::{ExecutionLogEntry, RunStatus};

/// Storage failure as seen by the orchestrator.
#[derive(Debug, Error)]
#[error("storage error: {0}")]
pub struct StoreError(pub String);

/// Notification delivery failure. Recorded on the digest record, never fatal
/// to the run.
#[derive(Debug, Error)]
#[error("notification error: {0}")]
pub struct NotifyError(pub String);

/// Harvests trending repositories from the code-hosting source.
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn harvest(&self, limit: usize, keywords: &KeywordSet) -> Vec<RepoItem>;
}

/// Harvests trending videos from the video platform.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn harvest(&self, limit: usize, keywords: &KeywordSet) -> Vec<VideoItem>;
}

/// Persistence collaborator: digest records plus the execution ledger.
#[async_trait]
pub trait DigestStore: Send + Sync {
    async fn get_by_date(&self, date: NaiveDate) -> Result<Option<DigestRecord>, StoreError>;

    /// Insert or replace the record for its date (overwrite semantics).
    async fn upsert(&self, record: &DigestRecord) -> Result<(), StoreError>;

    async fn mark_notified(&self, date: NaiveDate) -> Result<(), StoreError>;

    /// Most recent digests as summaries, newest first.
    async fn recent_digests(&self, limit: i64) -> Result<Vec<DigestBrief>, StoreError>;

    /// Create a ledger entry in `Running` state; returns its run id.
    async fn create_log_entry(&self) -> Result<Uuid, StoreError>;

    /// Finalize a ledger entry exactly once. A second finalize for the same
    /// run id is a storage error.
    async fn finalize_log_entry(
        &self,
        run_id: Uuid,
        status: RunStatus,
        repo_count: i32,
        video_count: i32,
        duration_ms: i64,
        error_message: Option<&str>,
    ) -> Result<(), StoreError>;

    async fn recent_log_entries(&self, limit: i64) -> Result<Vec<ExecutionLogEntry>, StoreError>;
}

/// Delivery channel for a completed digest. Fire-and-forget from the run's
/// terminal-status perspective.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, record: &DigestRecord) -> Result<(), NotifyError>;
}
