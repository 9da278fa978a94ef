//! Postgres-backed implementation of the orchestrator's storage seam.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use aidigest_core::{
    DigestBrief, DigestRecord, DigestStore, ExecutionLogEntry, RepoItem, RunStatus, StoreError,
    VideoItem,
};

use crate::digest_records::{
    get_digest_record, list_digest_briefs, mark_digest_notified, upsert_digest_record,
    DigestRecordRow,
};
use crate::execution_logs::{create_execution_log, finalize_execution_log, list_execution_logs};
use crate::ExecutionLogRow;

pub struct PgDigestStore {
    pool: PgPool,
}

impl PgDigestStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_err(e: impl std::fmt::Display) -> StoreError {
    StoreError(e.to_string())
}

fn record_from_row(row: DigestRecordRow) -> Result<DigestRecord, StoreError> {
    let repo_items: Vec<RepoItem> = serde_json::from_value(row.repo_items).map_err(store_err)?;
    let video_items: Vec<VideoItem> = serde_json::from_value(row.video_items).map_err(store_err)?;
    Ok(DigestRecord {
        digest_date: row.digest_date,
        repo_items,
        video_items,
        notified: row.notified,
        notified_at: row.notified_at,
    })
}

fn entry_from_row(row: ExecutionLogRow) -> Result<ExecutionLogEntry, StoreError> {
    let status: RunStatus = row.status.parse().map_err(store_err)?;
    Ok(ExecutionLogEntry {
        run_id: row.run_id,
        started_at: row.started_at,
        completed_at: row.completed_at,
        status,
        repo_count: row.repo_count,
        video_count: row.video_count,
        duration_ms: row.duration_ms,
        error_message: row.error_message,
    })
}

#[async_trait]
impl DigestStore for PgDigestStore {
    async fn get_by_date(&self, date: NaiveDate) -> Result<Option<DigestRecord>, StoreError> {
        let row = get_digest_record(&self.pool, date).await.map_err(store_err)?;
        row.map(record_from_row).transpose()
    }

    async fn upsert(&self, record: &DigestRecord) -> Result<(), StoreError> {
        let repo_items = serde_json::to_value(&record.repo_items).map_err(store_err)?;
        let video_items = serde_json::to_value(&record.video_items).map_err(store_err)?;
        upsert_digest_record(&self.pool, record.digest_date, &repo_items, &video_items)
            .await
            .map_err(store_err)
    }

    async fn mark_notified(&self, date: NaiveDate) -> Result<(), StoreError> {
        mark_digest_notified(&self.pool, date).await.map_err(store_err)
    }

    async fn recent_digests(&self, limit: i64) -> Result<Vec<DigestBrief>, StoreError> {
        let rows = list_digest_briefs(&self.pool, limit).await.map_err(store_err)?;
        Ok(rows
            .into_iter()
            .map(|row| DigestBrief {
                digest_date: row.digest_date,
                repo_count: row.repo_count,
                video_count: row.video_count,
                notified: row.notified,
            })
            .collect())
    }

    async fn create_log_entry(&self) -> Result<Uuid, StoreError> {
        let row = create_execution_log(&self.pool).await.map_err(store_err)?;
        Ok(row.run_id)
    }

    async fn finalize_log_entry(
        &self,
        run_id: Uuid,
        status: RunStatus,
        repo_count: i32,
        video_count: i32,
        duration_ms: i64,
        error_message: Option<&str>,
    ) -> Result<(), StoreError> {
        finalize_execution_log(
            &self.pool,
            run_id,
            status.as_str(),
            repo_count,
            video_count,
            duration_ms,
            error_message,
        )
        .await
        .map_err(store_err)
    }

    async fn recent_log_entries(&self, limit: i64) -> Result<Vec<ExecutionLogEntry>, StoreError> {
        let rows = list_execution_logs(&self.pool, limit).await.map_err(store_err)?;
        rows.into_iter().map(entry_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidigest_core::Enrichment;
    use chrono::Utc;

    #[test]
    fn digest_row_round_trips_through_json() {
        let record = DigestRecord {
            digest_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            repo_items: vec![RepoItem {
                full_name: "acme/agent-kit".to_owned(),
                url: "https://github.com/acme/agent-kit".to_owned(),
                stars: 1200,
                stars_today: 40,
                forks: 7,
                description: "toolkit".to_owned(),
                language: "Rust".to_owned(),
                topics: vec!["llm".to_owned()],
                analysis: Enrichment::Unenriched,
            }],
            video_items: Vec::new(),
            notified: false,
            notified_at: None,
        };

        let row = DigestRecordRow {
            id: 1,
            digest_date: record.digest_date,
            repo_items: serde_json::to_value(&record.repo_items).unwrap(),
            video_items: serde_json::to_value(&record.video_items).unwrap(),
            notified: false,
            notified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let restored = record_from_row(row).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn ledger_row_converts_and_rejects_unknown_status() {
        let row = ExecutionLogRow {
            id: 1,
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            completed_at: Some(Utc::now()),
            status: "partially_succeeded".to_owned(),
            repo_count: 10,
            video_count: 0,
            duration_ms: Some(1500),
            error_message: None,
            created_at: Utc::now(),
        };
        let entry = entry_from_row(row.clone()).unwrap();
        assert_eq!(entry.status, RunStatus::PartiallySucceeded);

        let mut bad = row;
        bad.status = "exploded".to_owned();
        assert!(entry_from_row(bad).is_err());
    }
}
