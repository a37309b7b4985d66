//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring price-alert sweep.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use genie_core::Product;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<genie_core::AppConfig>,
    catalog: Arc<Vec<Product>>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_alert_sweep_job(&scheduler, pool, &config, catalog).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring price-alert sweep.
///
/// Runs on `GENIE_ALERT_SWEEP_SCHEDULE` (hourly by default). Each run
/// refreshes every active alert's `current_price` from the catalog and
/// marks alerts whose quote has dropped to or below the target.
async fn register_alert_sweep_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: &genie_core::AppConfig,
    catalog: Arc<Vec<Product>>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async(config.alert_sweep_schedule.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let catalog = Arc::clone(&catalog);

        Box::pin(async move {
            tracing::info!("scheduler: starting price-alert sweep");
            match genie_db::sweep_price_alerts(&pool, &catalog).await {
                Ok(outcome) => {
                    tracing::info!(
                        refreshed = outcome.refreshed,
                        newly_triggered = outcome.newly_triggered,
                        "scheduler: price-alert sweep complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: price-alert sweep failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
