//! Video harvest pipeline: keyword search, hydration, ranking, then
//! concurrent enrichment under a deadline.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use aidigest_analysis::{AnalysisClient, VideoPayload};
use aidigest_core::{Enrichment, KeywordSet, VideoAnalysis, VideoItem, VideoSource};
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;

use crate::client::YoutubeClient;
use crate::retry::retry_with_backoff;
use crate::transcript;
use crate::types::{parse_iso8601_duration, VideoResource};

/// Additional attempts after the first, per API call.
const SEARCH_RETRIES: u32 = 2;
/// Comments fetched when a video has no transcript.
const COMMENT_FALLBACK_MAX: u32 = 5;
/// The videos endpoint accepts at most 50 ids per call.
const VIDEOS_PER_CALL: usize = 50;

/// One hydrated candidate. The description is carried separately because it
/// feeds the analysis prompt but is not part of the digest item.
struct Candidate {
    item: VideoItem,
    description: String,
}

pub struct YoutubeHarvester {
    client: YoutubeClient,
    analysis: Arc<AnalysisClient>,
    max_concurrent: usize,
    analysis_deadline: Duration,
    backoff_base_ms: u64,
    timedtext_url: Option<String>,
}

impl YoutubeHarvester {
    pub fn new(
        client: YoutubeClient,
        analysis: Arc<AnalysisClient>,
        max_concurrent: usize,
        analysis_deadline: Duration,
        backoff_base_ms: u64,
    ) -> Self {
        Self {
            client,
            analysis,
            max_concurrent: max_concurrent.max(1),
            analysis_deadline,
            backoff_base_ms,
            timedtext_url: None,
        }
    }

    /// Overrides the timedtext endpoint URL (for testing).
    #[must_use]
    pub fn with_timedtext_url(mut self, url: &str) -> Self {
        self.timedtext_url = Some(url.to_owned());
        self
    }

    async fn search_keyword(
        &self,
        keyword: &str,
        published_after: chrono::DateTime<Utc>,
        max_results: u32,
    ) -> Vec<String> {
        let result = retry_with_backoff(SEARCH_RETRIES, self.backoff_base_ms, || {
            self.client
                .search_video_ids(keyword, published_after, max_results)
        })
        .await;
        match result {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(keyword, error = %e, "video search failed; skipping keyword");
                Vec::new()
            }
        }
    }

    async fn hydrate(&self, ids: &[String]) -> Vec<VideoResource> {
        let mut videos = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(VIDEOS_PER_CALL) {
            let result = retry_with_backoff(SEARCH_RETRIES, self.backoff_base_ms, || {
                self.client.list_videos(chunk)
            })
            .await;
            match result {
                Ok(batch) => videos.extend(batch),
                Err(e) => {
                    tracing::warn!(count = chunk.len(), error = %e, "video hydration failed; skipping batch");
                }
            }
        }
        videos
    }

    /// Builds the analysis payload for one candidate: transcript when a
    /// caption track exists, otherwise description plus top comments.
    async fn payload_for(&self, candidate: &Candidate) -> VideoPayload {
        let video_id = &candidate.item.video_id;
        let transcript = transcript::fetch_transcript(
            self.client.http(),
            self.timedtext_url.as_deref(),
            video_id,
        )
        .await;

        let top_comments = if transcript.is_some() {
            Vec::new()
        } else {
            match self.client.top_comments(video_id, COMMENT_FALLBACK_MAX).await {
                Ok(comments) => comments,
                Err(e) => {
                    tracing::debug!(video = %video_id, error = %e, "comment fallback unavailable");
                    Vec::new()
                }
            }
        };

        VideoPayload {
            title: candidate.item.title.clone(),
            channel: candidate.item.channel.clone(),
            description: candidate.description.clone(),
            view_count: candidate.item.view_count,
            duration: format_duration(candidate.item.duration_secs),
            transcript,
            top_comments,
        }
    }

    /// Runs analysis over the ranked candidates concurrently, stopping at the
    /// deadline. Items whose analysis did not complete stay unenriched.
    async fn enrich(&self, candidates: &mut [Candidate]) {
        let deadline = tokio::time::Instant::now() + self.analysis_deadline;
        let jobs: Vec<_> = candidates
            .iter()
            .map(|candidate| async move {
                let video_id = candidate.item.video_id.clone();
                let payload = self.payload_for(candidate).await;
                match self.analysis.analyze_video(&payload).await {
                    Ok(analysis) => Some((video_id, analysis)),
                    Err(e) => {
                        tracing::warn!(video = %video_id, error = %e, "video analysis failed");
                        None
                    }
                }
            })
            .collect();

        let mut stream = futures::stream::iter(jobs).buffer_unordered(self.max_concurrent);
        let mut completed: HashMap<String, VideoAnalysis> = HashMap::new();
        loop {
            match tokio::time::timeout_at(deadline, stream.next()).await {
                Ok(Some(Some((video_id, analysis)))) => {
                    completed.insert(video_id, analysis);
                }
                Ok(Some(None)) => {}
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        completed = completed.len(),
                        total = candidates.len(),
                        "analysis deadline expired; remaining videos stay unenriched"
                    );
                    break;
                }
            }
        }
        drop(stream);

        for candidate in candidates.iter_mut() {
            if let Some(analysis) = completed.remove(&candidate.item.video_id) {
                candidate.item.analysis = Enrichment::Enriched(analysis);
            }
        }
    }
}

fn to_candidate(video: VideoResource) -> Candidate {
    let url = format!("https://www.youtube.com/watch?v={}", video.id);
    Candidate {
        item: VideoItem {
            video_id: video.id,
            title: video.snippet.title,
            channel: video.snippet.channel_title,
            url,
            view_count: video.statistics.views(),
            like_count: video.statistics.likes(),
            comment_count: video.statistics.comments(),
            published_at: video.snippet.published_at,
            duration_secs: parse_iso8601_duration(&video.content_details.duration),
            analysis: Enrichment::Unenriched,
        },
        description: video.snippet.description,
    }
}

/// Orders candidates by view count descending, then like count descending.
/// Remaining ties keep a stable order by id so repeated runs agree.
fn rank_videos(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.item
            .view_count
            .cmp(&a.item.view_count)
            .then_with(|| b.item.like_count.cmp(&a.item.like_count))
            .then_with(|| a.item.video_id.cmp(&b.item.video_id))
    });
}

/// Formats whole seconds as `H:MM:SS` or `M:SS` for the analysis prompt.
fn format_duration(secs: i64) -> String {
    let secs = secs.max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[async_trait]
impl VideoSource for YoutubeHarvester {
    async fn harvest(&self, limit: usize, keywords: &KeywordSet) -> Vec<VideoItem> {
        if !self.client.is_available() {
            tracing::info!("YouTube API key absent; video harvest disabled");
            return Vec::new();
        }

        let published_after = Utc::now() - chrono::Duration::hours(24);
        let max_results = u32::try_from(limit).unwrap_or(10).max(1);

        let mut seen: HashSet<String> = HashSet::new();
        let mut ids: Vec<String> = Vec::new();
        for keyword in &keywords.video {
            for id in self.search_keyword(keyword, published_after, max_results).await {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }

        let mut candidates: Vec<Candidate> =
            self.hydrate(&ids).await.into_iter().map(to_candidate).collect();
        rank_videos(&mut candidates);
        candidates.truncate(limit);

        if self.analysis.is_available() && !candidates.is_empty() {
            self.enrich(&mut candidates).await;
        } else if !self.analysis.is_available() {
            tracing::info!("analysis client disabled; videos stay unenriched");
        }

        let items: Vec<VideoItem> = candidates.into_iter().map(|c| c.item).collect();
        tracing::info!(count = items.len(), "video harvest complete");
        items
    }
}
