//! Domain model for one dated digest: enriched repository and video items.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Enrichment state attached to every digest item.
///
/// `Unenriched` is a normal state, not an error: an item whose analysis call
/// exhausted all retries and fallback models is still included in the digest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "analysis", rename_all = "snake_case")]
pub enum Enrichment<T> {
    Enriched(T),
    #[default]
    Unenriched,
}

impl<T> Enrichment<T> {
    #[must_use]
    pub fn is_enriched(&self) -> bool {
        matches!(self, Enrichment::Enriched(_))
    }

    #[must_use]
    pub fn as_enriched(&self) -> Option<&T> {
        match self {
            Enrichment::Enriched(value) => Some(value),
            Enrichment::Unenriched => None,
        }
    }
}

impl<T> From<Option<T>> for Enrichment<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Enrichment::Unenriched, Enrichment::Enriched)
    }
}

/// LLM commentary for a trending repository.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepoAnalysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub why_trending: String,
    #[serde(default)]
    pub key_innovations: Vec<String>,
    #[serde(default)]
    pub practical_value: String,
    #[serde(default)]
    pub learning_points: Vec<String>,
}

/// LLM commentary for a trending video.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VideoAnalysis {
    #[serde(default)]
    pub content_summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub why_popular: String,
    #[serde(default)]
    pub practical_takeaways: String,
    #[serde(default)]
    pub recommended_for: String,
}

/// One trending repository. Identity within a run is `full_name` (owner/name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoItem {
    pub full_name: String,
    pub url: String,
    pub stars: i64,
    pub stars_today: i64,
    pub forks: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub analysis: Enrichment<RepoAnalysis>,
}

/// One trending video. Identity within a run is the platform `video_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoItem {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub url: String,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_secs: i64,
    #[serde(default)]
    pub analysis: Enrichment<VideoAnalysis>,
}

/// One dated digest. Exactly one record exists per calendar date; a forced
/// re-run replaces the record wholesale (overwrite, never append).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestRecord {
    pub digest_date: NaiveDate,
    pub repo_items: Vec<RepoItem>,
    pub video_items: Vec<VideoItem>,
    #[serde(default)]
    pub notified: bool,
    #[serde(default)]
    pub notified_at: Option<DateTime<Utc>>,
}

impl DigestRecord {
    #[must_use]
    pub fn new(digest_date: NaiveDate, repo_items: Vec<RepoItem>, video_items: Vec<VideoItem>) -> Self {
        Self {
            digest_date,
            repo_items,
            video_items,
            notified: false,
            notified_at: None,
        }
    }
}

/// Payload-free digest summary for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestBrief {
    pub digest_date: NaiveDate,
    pub repo_count: i32,
    pub video_count: i32,
    pub notified: bool,
}
