//! Wire types for the YouTube Data API v3 list endpoints.
//!
//! Statistics counters arrive as decimal strings; absent counters (comments
//! disabled, hidden like counts) parse to zero rather than failing the item.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoResource>,
}

/// One video as returned by `GET /videos?part=snippet,statistics,contentDetails`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResource {
    pub id: String,
    pub snippet: VideoSnippet,
    #[serde(default)]
    pub statistics: VideoStatistics,
    #[serde(default)]
    pub content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    #[serde(default)]
    pub view_count: Option<String>,
    #[serde(default)]
    pub like_count: Option<String>,
    #[serde(default)]
    pub comment_count: Option<String>,
}

impl VideoStatistics {
    pub(crate) fn views(&self) -> i64 {
        parse_count(self.view_count.as_deref())
    }

    pub(crate) fn likes(&self) -> i64 {
        parse_count(self.like_count.as_deref())
    }

    pub(crate) fn comments(&self) -> i64 {
        parse_count(self.comment_count.as_deref())
    }
}

fn parse_count(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

#[derive(Debug, Default, Deserialize)]
pub struct ContentDetails {
    /// ISO-8601 duration, e.g. `PT1H2M3S`.
    #[serde(default)]
    pub duration: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentThreadsResponse {
    #[serde(default)]
    pub items: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
pub struct CommentThread {
    pub snippet: CommentThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadSnippet {
    pub top_level_comment: TopLevelComment,
}

#[derive(Debug, Deserialize)]
pub struct TopLevelComment {
    pub snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnippet {
    #[serde(default)]
    pub text_display: String,
}

/// Parses an ISO-8601 duration of the `PT#H#M#S` family into whole seconds.
/// Malformed input parses to zero; duration is display metadata, not a
/// correctness input.
#[must_use]
pub fn parse_iso8601_duration(raw: &str) -> i64 {
    let Some(rest) = raw.strip_prefix("PT") else {
        return 0;
    };
    let mut total = 0i64;
    let mut digits = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let value: i64 = digits.parse().unwrap_or(0);
        digits.clear();
        total += match c {
            'H' => value * 3600,
            'M' => value * 60,
            'S' => value,
            _ => 0,
        };
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_parse_to_seconds() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_iso8601_duration("PT15M"), 900);
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration("PT2H"), 7200);
    }

    #[test]
    fn malformed_duration_is_zero() {
        assert_eq!(parse_iso8601_duration(""), 0);
        assert_eq!(parse_iso8601_duration("P1D"), 0);
        assert_eq!(parse_iso8601_duration("garbage"), 0);
    }

    #[test]
    fn string_counters_parse_and_default() {
        let stats = VideoStatistics {
            view_count: Some("120453".to_owned()),
            like_count: None,
            comment_count: Some("not-a-number".to_owned()),
        };
        assert_eq!(stats.views(), 120_453);
        assert_eq!(stats.likes(), 0);
        assert_eq!(stats.comments(), 0);
    }

    #[test]
    fn video_resource_deserializes_from_api_shape() {
        let raw = r#"{
            "id": "abc123",
            "snippet": {
                "title": "Building agents",
                "channelTitle": "AI Lab",
                "publishedAt": "2025-06-01T10:00:00Z",
                "description": "A walkthrough"
            },
            "statistics": {"viewCount": "900", "likeCount": "50"},
            "contentDetails": {"duration": "PT10M"}
        }"#;
        let video: VideoResource = serde_json::from_str(raw).unwrap();
        assert_eq!(video.id, "abc123");
        assert_eq!(video.snippet.channel_title, "AI Lab");
        assert_eq!(video.statistics.views(), 900);
        assert_eq!(parse_iso8601_duration(&video.content_details.duration), 600);
    }
}
