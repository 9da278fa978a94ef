//! Database operations for the `digest_records` table.
//!
//! Item lists are stored as JSONB documents; serialization to and from the
//! domain types happens in [`crate::store`].

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `digest_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DigestRecordRow {
    pub id: i64,
    pub digest_date: NaiveDate,
    pub repo_items: serde_json::Value,
    pub video_items: serde_json::Value,
    pub notified: bool,
    pub notified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Summary row for digest listings: dates and item counts, no payloads.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DigestBriefRow {
    pub digest_date: NaiveDate,
    pub repo_count: i32,
    pub video_count: i32,
    pub notified: bool,
}

/// Inserts or wholesale-replaces the record for a date. A replacement resets
/// the notification flag, because the replaced content was never delivered.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_digest_record(
    pool: &PgPool,
    digest_date: NaiveDate,
    repo_items: &serde_json::Value,
    video_items: &serde_json::Value,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO digest_records (digest_date, repo_items, video_items) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (digest_date) DO UPDATE SET \
             repo_items  = EXCLUDED.repo_items, \
             video_items = EXCLUDED.video_items, \
             notified    = FALSE, \
             notified_at = NULL, \
             updated_at  = NOW()",
    )
    .bind(digest_date)
    .bind(repo_items)
    .bind(video_items)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fetches the record for a date, if one exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_digest_record(
    pool: &PgPool,
    digest_date: NaiveDate,
) -> Result<Option<DigestRecordRow>, DbError> {
    let row = sqlx::query_as::<_, DigestRecordRow>(
        "SELECT id, digest_date, repo_items, video_items, notified, notified_at, \
                created_at, updated_at \
         FROM digest_records \
         WHERE digest_date = $1",
    )
    .bind(digest_date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Marks the record for a date as notified with the current timestamp.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no record exists for the date, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_digest_notified(pool: &PgPool, digest_date: NaiveDate) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE digest_records \
         SET notified = TRUE, notified_at = NOW(), updated_at = NOW() \
         WHERE digest_date = $1",
    )
    .bind(digest_date)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

/// Returns the most recent `limit` digests as summaries, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_digest_briefs(pool: &PgPool, limit: i64) -> Result<Vec<DigestBriefRow>, DbError> {
    let rows = sqlx::query_as::<_, DigestBriefRow>(
        "SELECT digest_date, \
                jsonb_array_length(repo_items)::INT AS repo_count, \
                jsonb_array_length(video_items)::INT AS video_count, \
                notified \
         FROM digest_records \
         ORDER BY digest_date DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
