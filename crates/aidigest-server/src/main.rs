mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use aidigest_analysis::{AnalysisClient, ModelAttempts};
use aidigest_core::{DigestStore, KeywordSet, Notifier};
use aidigest_db::PgDigestStore;
use aidigest_digest::{DigestService, NoopNotifier, WebhookNotifier};
use aidigest_github::{GithubClient, GithubHarvester};
use aidigest_youtube::{YoutubeClient, YoutubeHarvester};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(aidigest_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = aidigest_db::PoolConfig::from_app_config(&config);
    let pool = aidigest_db::connect_pool(&config.database_url, pool_config).await?;
    aidigest_db::run_migrations(&pool).await?;

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

    let store: Arc<dyn DigestStore> = Arc::new(PgDigestStore::new(pool.clone()));
    let service = Arc::new(DigestService::new(
        Arc::clone(&store),
        repos,
        videos,
        notifier,
        keywords,
        config.repo_limit,
        config.video_limit,
    ));

    let _scheduler = scheduler::build_scheduler(
        Arc::clone(&service),
        &config.schedule_cron,
        config.notify_webhook_url.is_some(),
    )
    .await?;

    let app = build_app(AppState {
        pool,
        store,
        service,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "digest server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
