//! Command handlers for the CLI.
//!
//! Each handler loads configuration, connects to the database, and builds
//! only the collaborators it needs.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;

use aidigest_analysis::{AnalysisClient, ModelAttempts};
use aidigest_core::{AppConfig, DigestStore, KeywordSet, Notifier};
use aidigest_db::PgDigestStore;
use aidigest_digest::{DigestService, NoopNotifier, WebhookNotifier};
use aidigest_github::{GithubClient, GithubHarvester};
use aidigest_youtube::{YoutubeClient, YoutubeHarvester};

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool_config = aidigest_db::PoolConfig::from_app_config(config);
    let pool = aidigest_db::connect_pool(&config.database_url, pool_config).await?;
    aidigest_db::run_migrations(&pool).await?;
    Ok(pool)
}

fn build_service(config: &AppConfig, pool: PgPool) -> anyhow::Result<DigestService> {
    let keywords = KeywordSet::load(&config.keywords_path)?;
    let analysis = Arc::new(AnalysisClient::new(
        config.llm_api_key.as_deref(),
        &config.llm_base_url,
        ModelAttempts::plan(
            &config.llm_model,
            config.analysis_max_attempts,
            &config.llm_fallback_models,
        ),
        config.analysis_backoff_base_ms,
        config.request_timeout_secs,
    )?);

    let run_deadline = Duration::from_secs(config.run_timeout_secs);
    let repos = Arc::new(GithubHarvester::new(
        GithubClient::new(config.github_token.as_deref(), config.request_timeout_secs)?,
        Arc::clone(&analysis),
        config.analysis_max_concurrent,
        run_deadline,
        config.analysis_backoff_base_ms,
    ));
    let videos = Arc::new(YoutubeHarvester::new(
        YoutubeClient::new(config.youtube_api_key.as_deref(), config.request_timeout_secs)?,
        Arc::clone(&analysis),
        config.analysis_max_concurrent,
        run_deadline,
        config.analysis_backoff_base_ms,
    ));
    let notifier: Arc<dyn Notifier> = match &config.notify_webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url, config.request_timeout_secs)?),
        None => Arc::new(NoopNotifier),
    };
    let store: Arc<dyn DigestStore> = Arc::new(PgDigestStore::new(pool));

    Ok(DigestService::new(
        store,
        repos,
        videos,
        notifier,
        keywords,
        config.repo_limit,
        config.video_limit,
    ))
}

/// Produce the digest for `date` and print a summary of the result.
pub(crate) async fn run_digest(
    date: Option<NaiveDate>,
    force: bool,
    notify: bool,
) -> anyhow::Result<()> {
    let config = aidigest_core::load_app_config()?;
    let pool = connect(&config).await?;
    let service = build_service(&config, pool)?;

    let date = date.unwrap_or_else(|| Utc::now().date_naive());
    let record = service.run(date, force, notify).await?;

    println!(
        "digest for {}: {} repos, {} videos{}",
        record.digest_date,
        record.repo_items.len(),
        record.video_items.len(),
        if record.notified { ", notified" } else { "" }
    );
    for repo in &record.repo_items {
        println!(
            "  [repo] {} ★{} (+{} today)",
            repo.full_name, repo.stars, repo.stars_today
        );
    }
    for video in &record.video_items {
        println!(
            "  [video] {} by {} ({} views)",
            video.title, video.channel, video.view_count
        );
    }
    Ok(())
}

/// Print recent digest summaries, newest first.
pub(crate) async fn show_history(limit: i64) -> anyhow::Result<()> {
    let config = aidigest_core::load_app_config()?;
    let pool = connect(&config).await?;
    let store = PgDigestStore::new(pool);

    let briefs = store
        .recent_digests(limit)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    if briefs.is_empty() {
        println!("no digests recorded yet");
        return Ok(());
    }
    for brief in briefs {
        println!(
            "{}  repos={:<3} videos={:<3} notified={}",
            brief.digest_date, brief.repo_count, brief.video_count, brief.notified
        );
    }
    Ok(())
}

/// Print recent run-ledger entries, newest first.
pub(crate) async fn show_logs(limit: i64) -> anyhow::Result<()> {
    let config = aidigest_core::load_app_config()?;
    let pool = connect(&config).await?;
    let store = PgDigestStore::new(pool);

    let entries = store
        .recent_log_entries(limit)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    if entries.is_empty() {
        println!("no runs recorded yet");
        return Ok(());
    }
    for entry in entries {
        println!(
            "{}  {}  status={:<20} repos={:<3} videos={:<3} duration={}ms",
            entry.run_id,
            entry.started_at.format("%Y-%m-%d %H:%M:%S"),
            entry.status,
            entry.repo_count,
            entry.video_count,
            entry.duration_ms.unwrap_or(0)
        );
    }
    Ok(())
}
