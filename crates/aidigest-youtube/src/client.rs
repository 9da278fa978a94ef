//! Thin client over the YouTube Data API v3 list endpoints.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, StatusCode};

use crate::error::YoutubeError;
use crate::types::{CommentThreadsResponse, SearchListResponse, VideoListResponse, VideoResource};

const DEFAULT_API_URL: &str = "https://www.googleapis.com/youtube/v3";

pub struct YoutubeClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl YoutubeClient {
    /// Creates a new client pointed at the production Data API.
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: Option<&str>, timeout_secs: u64) -> Result<Self, YoutubeError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_API_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`YoutubeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        api_key: Option<&str>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, YoutubeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("aidigest/0.1 (trending-digest)")
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.map(str::to_owned),
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Whether the client holds an API key. Without one the video harvest is
    /// disabled and contributes an empty list.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// The underlying HTTP client, shared with the transcript fetch.
    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// Searches for videos matching one keyword, most-viewed first, published
    /// after `published_after`. Returns video ids only; a follow-up
    /// [`Self::list_videos`] call hydrates them.
    ///
    /// # Errors
    ///
    /// - [`YoutubeError::QuotaExceeded`] on 403/429.
    /// - [`YoutubeError::UnexpectedStatus`] on other non-2xx statuses.
    /// - [`YoutubeError::Http`] on network failure.
    /// - [`YoutubeError::Deserialize`] on an unexpected body shape.
    pub async fn search_video_ids(
        &self,
        keyword: &str,
        published_after: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<String>, YoutubeError> {
        let url = format!("{}/search", self.base_url);
        let request = self.client.get(&url).query(&[
            ("part", "snippet"),
            ("type", "video"),
            ("order", "viewCount"),
            ("q", keyword),
            (
                "publishedAfter",
                &published_after.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("maxResults", &max_results.to_string()),
        ]);

        let body = self.send_checked(request, &url).await?;
        let parsed: SearchListResponse =
            serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
                context: format!("search(q={keyword})"),
                source: e,
            })?;
        Ok(parsed
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    /// Hydrates up to 50 video ids into full resources (snippet, statistics,
    /// duration). Ids the API no longer knows are silently absent from the
    /// result.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::search_video_ids`].
    pub async fn list_videos(&self, ids: &[String]) -> Result<Vec<VideoResource>, YoutubeError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/videos", self.base_url);
        let request = self.client.get(&url).query(&[
            ("part", "snippet,statistics,contentDetails"),
            ("id", &ids.join(",")),
        ]);

        let body = self.send_checked(request, &url).await?;
        let parsed: VideoListResponse =
            serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
                context: format!("videos(count={})", ids.len()),
                source: e,
            })?;
        Ok(parsed.items)
    }

    /// Fetches the most relevant top-level comments for a video, used as the
    /// analysis fallback when no transcript exists.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::search_video_ids`]. Disabled comments
    /// surface as a 403 like quota exhaustion does; callers degrade to an
    /// empty comment list either way.
    pub async fn top_comments(
        &self,
        video_id: &str,
        max_results: u32,
    ) -> Result<Vec<String>, YoutubeError> {
        let url = format!("{}/commentThreads", self.base_url);
        let request = self.client.get(&url).query(&[
            ("part", "snippet"),
            ("videoId", video_id),
            ("order", "relevance"),
            ("textFormat", "plainText"),
            ("maxResults", &max_results.to_string()),
        ]);

        let body = self.send_checked(request, &url).await?;
        let parsed: CommentThreadsResponse =
            serde_json::from_str(&body).map_err(|e| YoutubeError::Deserialize {
                context: format!("commentThreads(video={video_id})"),
                source: e,
            })?;
        Ok(parsed
            .items
            .into_iter()
            .map(|t| t.snippet.top_level_comment.snippet.text_display)
            .filter(|text| !text.is_empty())
            .collect())
    }

    /// Appends the API key, sends, and maps non-2xx statuses to errors.
    async fn send_checked(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<String, YoutubeError> {
        let request = match &self.api_key {
            Some(key) => request.query(&[("key", key.as_str())]),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(YoutubeError::QuotaExceeded {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(YoutubeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response.text().await?)
    }
}
