//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring monitoring sweep.

use std::sync::Arc;

use pulsecheck_monitor::MonitorDeps;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Registers the monitoring sweep job and starts the scheduler. Returns the
/// running [`JobScheduler`] handle, which must be kept alive for the lifetime
/// of the process; dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    deps: Arc<MonitorDeps>,
    sweep_cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_sweep_job(&scheduler, deps, sweep_cron).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring monitoring sweep.
///
/// The schedule comes from config (hourly by default). Each firing loads the
/// active subscriptions and runs the due ones; the sweep's own per-item
/// isolation means one bad subscription never takes the job down.
async fn register_sweep_job(
    scheduler: &JobScheduler,
    deps: Arc<MonitorDeps>,
    sweep_cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(sweep_cron, move |_uuid, _lock| {
        let deps = Arc::clone(&deps);

        Box::pin(async move {
            tracing::info!("scheduler: starting monitoring sweep");
            match pulsecheck_monitor::run_monitoring_sweep(&deps).await {
                Ok(report) => {
                    tracing::info!(
                        total = report.outcomes.len(),
                        completed = report.completed(),
                        no_data = report.no_data(),
                        not_due = report.not_due(),
                        failed = report.failed(),
                        "scheduler: monitoring sweep complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: monitoring sweep failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
