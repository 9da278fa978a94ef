//! Repository harvest pipeline: keyword search, trending merge, dedupe,
//! ranking, then concurrent enrichment under a deadline.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use aidigest_analysis::{AnalysisClient, RepoPayload};
use aidigest_core::{Enrichment, KeywordSet, RepoAnalysis, RepoItem, RepoSource};
use async_trait::async_trait;
use chrono::{Days, Utc};
use futures::StreamExt;

use crate::client::GithubClient;
use crate::ranking::{dedupe_keep_highest, rank_repos};
use crate::retry::retry_with_backoff;
use crate::trending::{self, TrendingRepo};
use crate::types::SearchRepo;

/// Additional attempts after the first, per keyword search.
const SEARCH_RETRIES: u32 = 2;

pub struct GithubHarvester {
    client: GithubClient,
    analysis: Arc<AnalysisClient>,
    max_concurrent: usize,
    analysis_deadline: Duration,
    backoff_base_ms: u64,
    trending_url: Option<String>,
}

impl GithubHarvester {
    pub fn new(
        client: GithubClient,
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
            trending_url: None,
        }
    }

    /// Overrides the trending-page URL (for testing).
    #[must_use]
    pub fn with_trending_url(mut self, url: &str) -> Self {
        self.trending_url = Some(url.to_owned());
        self
    }

    /// Searches one keyword with retry. An unrecoverable failure contributes
    /// nothing rather than failing the harvest.
    async fn search_keyword(
        &self,
        keyword: &str,
        pushed_since: &str,
        per_page: u32,
    ) -> Vec<SearchRepo> {
        let result = retry_with_backoff(SEARCH_RETRIES, self.backoff_base_ms, || {
            self.client.search_repositories(keyword, pushed_since, per_page)
        })
        .await;
        match result {
            Ok(repos) => repos,
            Err(e) => {
                tracing::warn!(keyword, error = %e, "keyword search failed; skipping keyword");
                Vec::new()
            }
        }
    }

    /// Fetches trending entries, separating them into a star-delta map and a
    /// list of AI-related candidates worth hydrating. Failure degrades to no
    /// deltas and no extra candidates.
    async fn trending_entries(&self) -> Vec<TrendingRepo> {
        match trending::fetch_trending(self.client.http(), self.trending_url.as_deref()).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "trending fetch failed; star deltas default to zero");
                Vec::new()
            }
        }
    }

    /// Hydrates a trending candidate into a full item. Failure skips it.
    async fn hydrate_trending(&self, full_name: &str) -> Option<SearchRepo> {
        match self.client.get_repo(full_name).await {
            Ok(repo) => Some(repo),
            Err(e) => {
                tracing::warn!(repo = full_name, error = %e, "trending hydrate failed; skipping");
                None
            }
        }
    }

    /// Runs analysis over the ranked items concurrently, stopping at the
    /// deadline. Items whose analysis did not complete stay unenriched.
    async fn enrich(&self, items: &mut [RepoItem]) {
        let deadline = tokio::time::Instant::now() + self.analysis_deadline;
        let jobs: Vec<_> = items.iter().map(|item| {
            let full_name = item.full_name.clone();
            let description = item.description.clone();
            let language = item.language.clone();
            let stars = item.stars;
            async move {
                let detail = self.client.fetch_repo_detail(&full_name).await;
                let payload = RepoPayload {
                    full_name: full_name.clone(),
                    description,
                    language,
                    stars,
                    readme: detail.readme,
                    code_files: detail.code_files,
                };
                match self.analysis.analyze_repo(&payload).await {
                    Ok(analysis) => Some((full_name, analysis)),
                    Err(e) => {
                        tracing::warn!(repo = %full_name, error = %e, "repo analysis failed");
                        None
                    }
                }
            }
        }).collect();

        let mut stream = futures::stream::iter(jobs).buffer_unordered(self.max_concurrent);
        let mut completed: HashMap<String, RepoAnalysis> = HashMap::new();
        loop {
            match tokio::time::timeout_at(deadline, stream.next()).await {
                Ok(Some(Some((full_name, analysis)))) => {
                    completed.insert(full_name, analysis);
                }
                Ok(Some(None)) => {}
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        completed = completed.len(),
                        total = items.len(),
                        "analysis deadline expired; remaining repos stay unenriched"
                    );
                    break;
                }
            }
        }

        for item in items.iter_mut() {
            if let Some(analysis) = completed.remove(&item.full_name) {
                item.analysis = Enrichment::Enriched(analysis);
            }
        }
    }
}

fn to_item(repo: SearchRepo) -> RepoItem {
    RepoItem {
        full_name: repo.full_name,
        url: repo.html_url,
        stars: repo.stargazers_count,
        stars_today: 0,
        forks: repo.forks_count,
        description: repo.description.unwrap_or_default(),
        language: repo.language.unwrap_or_default(),
        topics: repo.topics,
        analysis: Enrichment::Unenriched,
    }
}

#[async_trait]
impl RepoSource for GithubHarvester {
    async fn harvest(&self, limit: usize, keywords: &KeywordSet) -> Vec<RepoItem> {
        let pushed_since = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(1))
            .unwrap_or_else(|| Utc::now().date_naive())
            .format("%Y-%m-%d")
            .to_string();
        let per_page = u32::try_from(limit).unwrap_or(10).max(1);

        let mut candidates: Vec<RepoItem> = Vec::new();
        for keyword in &keywords.repo {
            let found = self.search_keyword(keyword, &pushed_since, per_page).await;
            candidates.extend(found.into_iter().map(to_item));
        }

        let trending = self.trending_entries().await;
        let deltas: HashMap<&str, i64> = trending
            .iter()
            .map(|t| (t.full_name.as_str(), t.stars_today))
            .collect();

        // Trending entries that read as AI-related but were missed by the
        // keyword searches become candidates of their own. Hydration fans
        // out under the same concurrency bound as enrichment.
        let unseen: Vec<&str> = trending
            .iter()
            .filter(|entry| !candidates.iter().any(|c| c.full_name == entry.full_name))
            .filter(|entry| {
                let haystack = format!(
                    "{} {}",
                    entry.full_name,
                    entry.description.as_deref().unwrap_or("")
                );
                keywords.matches_repo(&haystack)
            })
            .map(|entry| entry.full_name.as_str())
            .collect();
        let hydrate_futs: Vec<_> = unseen
            .into_iter()
            .map(|full_name| self.hydrate_trending(full_name))
            .collect();
        let hydrated: Vec<SearchRepo> = futures::stream::iter(hydrate_futs)
            .buffer_unordered(self.max_concurrent)
        .filter_map(|repo| async move { repo })
        .collect()
        .await;
        candidates.extend(hydrated.into_iter().map(to_item));

        for item in &mut candidates {
            item.stars_today = deltas.get(item.full_name.as_str()).copied().unwrap_or(0);
        }

        let mut items = dedupe_keep_highest(candidates);
        rank_repos(&mut items);
        items.truncate(limit);

        if self.analysis.is_available() && !items.is_empty() {
            self.enrich(&mut items).await;
        } else if !self.analysis.is_available() {
            tracing::info!("analysis client disabled; repos stay unenriched");
        }

        tracing::info!(count = items.len(), "repository harvest complete");
        items
    }
}
