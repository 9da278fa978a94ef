//! Database operations for the `execution_logs` ledger.
//!
//! Every run writes exactly one row: created in `running` state when the run
//! starts, finalized exactly once when it reaches a terminal status. The
//! finalize update is guarded on the current status so a duplicate finalize
//! surfaces as an error instead of silently rewriting history.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `execution_logs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExecutionLogRow {
    pub id: i64,
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: String,
    pub repo_count: i32,
    pub video_count: i32,
    pub duration_ms: Option<i64>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Creates a new ledger entry in `running` status.
///
/// Generates the public run id in Rust and binds it. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_execution_log(pool: &PgPool) -> Result<ExecutionLogRow, DbError> {
    let run_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, ExecutionLogRow>(
        "INSERT INTO execution_logs (run_id, status, started_at) \
         VALUES ($1, 'running', NOW()) \
         RETURNING id, run_id, started_at, completed_at, status, \
                   repo_count, video_count, duration_ms, error_message, created_at",
    )
    .bind(run_id)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Finalizes a `running` ledger entry with a terminal status and the run's
/// result counts.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the entry is not currently
/// `running` (already finalized, or never existed), or [`DbError::Sqlx`] if
/// the update fails.
pub async fn finalize_execution_log(
    pool: &PgPool,
    run_id: Uuid,
    status: &str,
    repo_count: i32,
    video_count: i32,
    duration_ms: i64,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE execution_logs \
         SET status = $1, completed_at = NOW(), repo_count = $2, video_count = $3, \
             duration_ms = $4, error_message = $5 \
         WHERE run_id = $6 AND status = 'running'",
    )
    .bind(status)
    .bind(repo_count)
    .bind(video_count)
    .bind(duration_ms)
    .bind(error_message)
    .bind(run_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            run_id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Returns the most recent `limit` ledger entries, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_execution_logs(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<ExecutionLogRow>, DbError> {
    let rows = sqlx::query_as::<_, ExecutionLogRow>(
        "SELECT id, run_id, started_at, completed_at, status, \
                repo_count, video_count, duration_ms, error_message, created_at \
         FROM execution_logs \
         ORDER BY started_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
