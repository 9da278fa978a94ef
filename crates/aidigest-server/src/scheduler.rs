//! Background job scheduler.
//!
//! Registers the recurring daily digest job at server startup. The cron
//! expression comes from configuration; the default fires at 08:00 UTC.

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use aidigest_digest::DigestService;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// digest job cannot be registered (e.g. a malformed cron expression), or the
/// scheduler fails to start.
pub async fn build_scheduler(
    service: Arc<DigestService>,
    schedule_cron: &str,
    notify: bool,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async(schedule_cron, move |_uuid, _lock| {
        let service = Arc::clone(&service);
        Box::pin(async move {
            let date = Utc::now().date_naive();
            tracing::info!(%date, "scheduler: starting daily digest run");
            match service.run(date, false, notify).await {
                Ok(record) => {
                    tracing::info!(
                        %date,
                        repos = record.repo_items.len(),
                        videos = record.video_items.len(),
                        "scheduler: daily digest run complete"
                    );
                }
                Err(e) => {
                    tracing::error!(%date, error = %e, "scheduler: daily digest run failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}
