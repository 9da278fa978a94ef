//! Digest run orchestration.
//!
//! One run per process at a time: the run lock is a `try_lock`ed mutex, so a
//! second concurrent request is rejected immediately instead of queueing.
//! Harvesters absorb their own failures; the only error that fails a run is
//! a failed persist of the digest record.

use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tokio::sync::Mutex;

use aidigest_core::{
    DigestRecord, DigestStore, KeywordSet, Notifier, RepoSource, RunStatus, StoreError, VideoSource,
};

#[derive(Debug, Error)]
pub enum RunError {
    /// Another run holds the lock. The caller should retry after the current
    /// run finishes, never queue behind it.
    #[error("a digest run is already in progress")]
    AlreadyRunning,

    /// The digest record could not be persisted. The ledger entry for the
    /// run is finalized as failed before this is returned.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

pub struct DigestService {
    store: Arc<dyn DigestStore>,
    repos: Arc<dyn RepoSource>,
    videos: Arc<dyn VideoSource>,
    notifier: Arc<dyn Notifier>,
    keywords: KeywordSet,
    repo_limit: usize,
    video_limit: usize,
    run_lock: Mutex<()>,
}

impl DigestService {
    pub fn new(
        store: Arc<dyn DigestStore>,
        repos: Arc<dyn RepoSource>,
        videos: Arc<dyn VideoSource>,
        notifier: Arc<dyn Notifier>,
        keywords: KeywordSet,
        repo_limit: usize,
        video_limit: usize,
    ) -> Self {
        Self {
            store,
            repos,
            videos,
            notifier,
            keywords,
            repo_limit,
            video_limit,
            run_lock: Mutex::new(()),
        }
    }

    /// Produces (or returns) the digest for `date`.
    ///
    /// Without `force`, an existing record for the date is returned as-is and
    /// no harvest happens. With `force`, the record is rebuilt and replaced
    /// wholesale. `notify` controls delivery of the finished digest; a failed
    /// delivery is recorded on the record but never fails the run.
    ///
    /// # Errors
    ///
    /// - [`RunError::AlreadyRunning`] if another run is in progress.
    /// - [`RunError::Persistence`] if the ledger entry cannot be created or
    ///   the digest record cannot be saved.
    pub async fn run(
        &self,
        date: NaiveDate,
        force: bool,
        notify: bool,
    ) -> Result<DigestRecord, RunError> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            return Err(RunError::AlreadyRunning);
        };

        if !force {
            if let Some(existing) = self.store.get_by_date(date).await? {
                tracing::info!(%date, "digest already exists; returning stored record");
                return Ok(existing);
            }
        }

        let started = Instant::now();
        let run_id = self.store.create_log_entry().await?;
        tracing::info!(%run_id, %date, force, "digest run started");

        let (repo_items, video_items) = tokio::join!(
            self.repos.harvest(self.repo_limit, &self.keywords),
            self.videos.harvest(self.video_limit, &self.keywords),
        );

        let status = if repo_items.is_empty() || video_items.is_empty() {
            RunStatus::PartiallySucceeded
        } else {
            RunStatus::Succeeded
        };
        let repo_count = i32::try_from(repo_items.len()).unwrap_or(i32::MAX);
        let video_count = i32::try_from(video_items.len()).unwrap_or(i32::MAX);
        let mut record = DigestRecord::new(date, repo_items, video_items);

        if let Err(e) = self.store.upsert(&record).await {
            tracing::error!(%run_id, error = %e, "digest persist failed");
            // The counts still reflect the completed harvests so the ledger
            // shows how much work was lost.
            self.finalize(
                run_id,
                RunStatus::Failed,
                repo_count,
                video_count,
                started,
                Some(&e.to_string()),
            )
            .await;
            return Err(RunError::Persistence(e));
        }

        if notify {
            match self.notifier.send(&record).await {
                Ok(()) => {
                    record.notified = true;
                    record.notified_at = Some(Utc::now());
                    if let Err(e) = self.store.mark_notified(date).await {
                        tracing::warn!(%run_id, error = %e, "failed to record notification flag");
                    }
                }
                Err(e) => {
                    tracing::warn!(%run_id, error = %e, "notification delivery failed");
                }
            }
        }

        self.finalize(run_id, status, repo_count, video_count, started, None)
            .await;
        tracing::info!(
            %run_id,
            status = %status,
            repo_count,
            video_count,
            "digest run finished"
        );
        Ok(record)
    }

    /// Finalizes the ledger entry; a failure here is logged but never
    /// overrides the run's outcome.
    async fn finalize(
        &self,
        run_id: uuid::Uuid,
        status: RunStatus,
        repo_count: i32,
        video_count: i32,
        started: Instant,
        error_message: Option<&str>,
    ) {
        let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
        if let Err(e) = self
            .store
            .finalize_log_entry(run_id, status, repo_count, video_count, duration_ms, error_message)
            .await
        {
            tracing::error!(%run_id, error = %e, "failed to finalize ledger entry");
        }
    }
}
