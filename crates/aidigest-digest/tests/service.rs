//! Orchestration tests over in-memory collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use aidigest_core::{
    DigestBrief, DigestRecord, DigestStore, Enrichment, ExecutionLogEntry, KeywordSet, Notifier,
    NotifyError, RepoItem, RepoSource, RunStatus, StoreError, VideoItem, VideoSource,
};
use aidigest_digest::{DigestService, RunError};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

fn repo(name: &str) -> RepoItem {
    RepoItem {
        full_name: name.to_owned(),
        url: format!("https://github.com/{name}"),
        stars: 100,
        stars_today: 5,
        forks: 2,
        description: String::new(),
        language: "Rust".to_owned(),
        topics: Vec::new(),
        analysis: Enrichment::Unenriched,
    }
}

fn video(id: &str) -> VideoItem {
    VideoItem {
        video_id: id.to_owned(),
        title: format!("video {id}"),
        channel: "Channel".to_owned(),
        url: format!("https://www.youtube.com/watch?v={id}"),
        view_count: 1_000,
        like_count: 10,
        comment_count: 1,
        published_at: None,
        duration_secs: 60,
        analysis: Enrichment::Unenriched,
    }
}

#[derive(Debug, Clone)]
struct FinalizedRun {
    status: RunStatus,
    repo_count: i32,
    video_count: i32,
    error_message: Option<String>,
}

#[derive(Default)]
struct StoreState {
    records: HashMap<NaiveDate, DigestRecord>,
    created_runs: Vec<Uuid>,
    finalized: HashMap<Uuid, FinalizedRun>,
    notified_dates: Vec<NaiveDate>,
}

#[derive(Default)]
struct MockStore {
    state: Mutex<StoreState>,
    fail_upsert: AtomicBool,
}

impl MockStore {
    async fn finalized_for(&self, run_id: Uuid) -> FinalizedRun {
        self.state.lock().await.finalized.get(&run_id).cloned().unwrap()
    }

    async fn only_run_id(&self) -> Uuid {
        let state = self.state.lock().await;
        assert_eq!(state.created_runs.len(), 1);
        state.created_runs[0]
    }
}

#[async_trait]
impl DigestStore for MockStore {
    async fn get_by_date(&self, date: NaiveDate) -> Result<Option<DigestRecord>, StoreError> {
        Ok(self.state.lock().await.records.get(&date).cloned())
    }

    async fn upsert(&self, record: &DigestRecord) -> Result<(), StoreError> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(StoreError("disk full".to_owned()));
        }
        self.state
            .lock()
            .await
            .records
            .insert(record.digest_date, record.clone());
        Ok(())
    }

    async fn mark_notified(&self, date: NaiveDate) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.notified_dates.push(date);
        if let Some(record) = state.records.get_mut(&date) {
            record.notified = true;
        }
        Ok(())
    }

    async fn recent_digests(&self, _limit: i64) -> Result<Vec<DigestBrief>, StoreError> {
        Ok(Vec::new())
    }

    async fn create_log_entry(&self) -> Result<Uuid, StoreError> {
        let run_id = Uuid::new_v4();
        self.state.lock().await.created_runs.push(run_id);
        Ok(run_id)
    }

    async fn finalize_log_entry(
        &self,
        run_id: Uuid,
        status: RunStatus,
        repo_count: i32,
        video_count: i32,
        _duration_ms: i64,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        let previous = state.finalized.insert(
            run_id,
            FinalizedRun {
                status,
                repo_count,
                video_count,
                error_message: error_message.map(str::to_owned),
            },
        );
        assert!(previous.is_none(), "ledger entry finalized twice");
        Ok(())
    }

    async fn recent_log_entries(&self, _limit: i64) -> Result<Vec<ExecutionLogEntry>, StoreError> {
        Ok(Vec::new())
    }
}

struct StaticRepos(Vec<RepoItem>, AtomicUsize);

impl StaticRepos {
    fn new(items: Vec<RepoItem>) -> Self {
        Self(items, AtomicUsize::new(0))
    }
}

#[async_trait]
impl RepoSource for StaticRepos {
    async fn harvest(&self, _limit: usize, _keywords: &KeywordSet) -> Vec<RepoItem> {
        self.1.fetch_add(1, Ordering::SeqCst);
        self.0.clone()
    }
}

struct StaticVideos(Vec<VideoItem>);

#[async_trait]
impl VideoSource for StaticVideos {
    async fn harvest(&self, _limit: usize, _keywords: &KeywordSet) -> Vec<VideoItem> {
        self.0.clone()
    }
}

/// Blocks until released, to hold the run lock open from a test.
struct BlockingRepos {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl RepoSource for BlockingRepos {
    async fn harvest(&self, _limit: usize, _keywords: &KeywordSet) -> Vec<RepoItem> {
        self.entered.notify_one();
        self.release.notified().await;
        vec![repo("a/slow")]
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: AtomicUsize,
    fail: AtomicBool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, _record: &DigestRecord) -> Result<(), NotifyError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError("webhook down".to_owned()));
        }
        Ok(())
    }
}

fn service(
    store: Arc<MockStore>,
    repos: Arc<dyn RepoSource>,
    videos: Arc<dyn VideoSource>,
    notifier: Arc<RecordingNotifier>,
) -> DigestService {
    DigestService::new(
        store,
        repos,
        videos,
        notifier,
        KeywordSet::default(),
        10,
        10,
    )
}

#[tokio::test]
async fn fresh_run_persists_and_finalizes_succeeded_with_matching_counts() {
    let store = Arc::new(MockStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let svc = service(
        store.clone(),
        Arc::new(StaticRepos::new(vec![repo("a/one"), repo("b/two")])),
        Arc::new(StaticVideos(vec![video("v1")])),
        notifier,
    );

    let record = svc.run(date(), false, false).await.unwrap();
    assert_eq!(record.repo_items.len(), 2);
    assert_eq!(record.video_items.len(), 1);
    assert!(!record.notified);

    let run = store.finalized_for(store.only_run_id().await).await;
    assert_eq!(run.status, RunStatus::Succeeded);
    assert_eq!(run.repo_count, 2);
    assert_eq!(run.video_count, 1);
    assert_eq!(run.error_message, None);
    assert!(store.state.lock().await.records.contains_key(&date()));
}

#[tokio::test]
async fn existing_record_short_circuits_without_harvest_or_ledger_entry() {
    let store = Arc::new(MockStore::default());
    let existing = DigestRecord::new(date(), vec![repo("a/old")], vec![video("v0")]);
    store
        .state
        .lock()
        .await
        .records
        .insert(date(), existing.clone());

    let repos = Arc::new(StaticRepos::new(vec![repo("a/new")]));
    let notifier = Arc::new(RecordingNotifier::default());
    let svc = service(
        store.clone(),
        repos.clone(),
        Arc::new(StaticVideos(vec![video("v1")])),
        notifier.clone(),
    );

    let record = svc.run(date(), false, true).await.unwrap();
    assert_eq!(record, existing);
    assert_eq!(repos.1.load(Ordering::SeqCst), 0, "no harvest happened");
    assert_eq!(notifier.sent.load(Ordering::SeqCst), 0, "no delivery happened");
    assert!(store.state.lock().await.created_runs.is_empty());
}

#[tokio::test]
async fn force_replaces_the_existing_record() {
    let store = Arc::new(MockStore::default());
    store
        .state
        .lock()
        .await
        .records
        .insert(date(), DigestRecord::new(date(), vec![repo("a/old")], vec![]));

    let svc = service(
        store.clone(),
        Arc::new(StaticRepos::new(vec![repo("a/new")])),
        Arc::new(StaticVideos(vec![video("v1")])),
        Arc::new(RecordingNotifier::default()),
    );

    let record = svc.run(date(), true, false).await.unwrap();
    assert_eq!(record.repo_items[0].full_name, "a/new");
    let stored = store.state.lock().await.records.get(&date()).cloned().unwrap();
    assert_eq!(stored.repo_items[0].full_name, "a/new");
}

#[tokio::test]
async fn empty_video_harvest_is_a_partial_success() {
    let store = Arc::new(MockStore::default());
    let svc = service(
        store.clone(),
        Arc::new(StaticRepos::new(vec![repo("a/one")])),
        Arc::new(StaticVideos(Vec::new())),
        Arc::new(RecordingNotifier::default()),
    );

    let record = svc.run(date(), false, false).await.unwrap();
    assert_eq!(record.repo_items.len(), 1);
    assert!(record.video_items.is_empty());

    let run = store.finalized_for(store.only_run_id().await).await;
    assert_eq!(run.status, RunStatus::PartiallySucceeded);
    assert_eq!(run.repo_count, 1);
    assert_eq!(run.video_count, 0);
}

#[tokio::test]
async fn persist_failure_fails_the_run_and_the_ledger_entry() {
    let store = Arc::new(MockStore::default());
    store.fail_upsert.store(true, Ordering::SeqCst);
    let svc = service(
        store.clone(),
        Arc::new(StaticRepos::new(vec![repo("a/one")])),
        Arc::new(StaticVideos(vec![video("v1")])),
        Arc::new(RecordingNotifier::default()),
    );

    let err = svc.run(date(), false, false).await.unwrap_err();
    assert!(matches!(err, RunError::Persistence(_)));

    let run = store.finalized_for(store.only_run_id().await).await;
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.error_message.unwrap().contains("disk full"));
    // The failed entry still records what the harvests produced.
    assert_eq!(run.repo_count, 1);
    assert_eq!(run.video_count, 1);
    assert!(store.state.lock().await.records.is_empty());
}

#[tokio::test]
async fn successful_notification_marks_the_record() {
    let store = Arc::new(MockStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let svc = service(
        store.clone(),
        Arc::new(StaticRepos::new(vec![repo("a/one")])),
        Arc::new(StaticVideos(vec![video("v1")])),
        notifier.clone(),
    );

    let record = svc.run(date(), false, true).await.unwrap();
    assert!(record.notified);
    assert!(record.notified_at.is_some());
    assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);
    assert_eq!(store.state.lock().await.notified_dates, vec![date()]);
}

#[tokio::test]
async fn failed_notification_does_not_fail_the_run() {
    let store = Arc::new(MockStore::default());
    let notifier = Arc::new(RecordingNotifier::default());
    notifier.fail.store(true, Ordering::SeqCst);
    let svc = service(
        store.clone(),
        Arc::new(StaticRepos::new(vec![repo("a/one")])),
        Arc::new(StaticVideos(vec![video("v1")])),
        notifier,
    );

    let record = svc.run(date(), false, true).await.unwrap();
    assert!(!record.notified);
    assert!(record.notified_at.is_none());
    assert!(store.state.lock().await.notified_dates.is_empty());

    let run = store.finalized_for(store.only_run_id().await).await;
    assert_eq!(run.status, RunStatus::Succeeded);
}

#[tokio::test]
async fn concurrent_run_is_rejected_not_queued() {
    let store = Arc::new(MockStore::default());
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let svc = Arc::new(service(
        store,
        Arc::new(BlockingRepos {
            entered: entered.clone(),
            release: release.clone(),
        }),
        Arc::new(StaticVideos(vec![video("v1")])),
        Arc::new(RecordingNotifier::default()),
    ));

    let background = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.run(date(), false, false).await })
    };
    // Wait until the first run holds the lock inside its harvest.
    tokio::time::timeout(Duration::from_secs(5), entered.notified())
        .await
        .unwrap();

    let second = svc.run(date(), false, false).await;
    assert!(matches!(second, Err(RunError::AlreadyRunning)));

    release.notify_one();
    let first = background.await.unwrap().unwrap();
    assert_eq!(first.repo_items[0].full_name, "a/slow");
}
