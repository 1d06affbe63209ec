//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring campaign sweep.

use std::sync::Arc;

use blogsmith_core::AppConfig;
use blogsmith_engine::{
    sweep_due, EngineDeps, EngineError, HttpCatalog, HttpWriter, NoopPublisher,
};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};

/// Every minute, on the minute. Override with `CAMPAIGN_SWEEP_CRON`.
const DEFAULT_SWEEP_CRON: &str = "0 * * * * *";

type ProductionDeps = EngineDeps<HttpCatalog, HttpWriter, NoopPublisher>;

/// Builds and starts the background job scheduler.
///
/// Registers the campaign sweep and starts the scheduler. Returns the
/// running [`JobScheduler`] handle, which must be kept alive for the
/// lifetime of the process — dropping it shuts down all jobs.
///
/// Without an OpenAI key the sweep is not registered: the API still serves
/// reads and lifecycle changes, but no campaign generates.
///
/// # Errors
///
/// Returns an error if the scheduler cannot be initialised, the sweep job
/// cannot be registered, or a generation collaborator cannot be built.
pub async fn build_scheduler(pool: PgPool, config: Arc<AppConfig>) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    match EngineDeps::production(pool, &config) {
        Ok(deps) => register_sweep_job(&scheduler, Arc::new(deps)).await?,
        Err(EngineError::MissingWriterKey) => {
            tracing::warn!(
                "OPENAI_API_KEY not set; campaign sweep disabled and nothing will generate"
            );
        }
        Err(e) => anyhow::bail!("failed to wire generation collaborators: {e}"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring due-campaign sweep.
///
/// Each tick claims due campaigns and runs a generation cycle for each; the
/// per-campaign lock keeps overlapping ticks from double-running a campaign.
async fn register_sweep_job(
    scheduler: &JobScheduler,
    deps: Arc<ProductionDeps>,
) -> anyhow::Result<()> {
    let cron =
        std::env::var("CAMPAIGN_SWEEP_CRON").unwrap_or_else(|_| DEFAULT_SWEEP_CRON.to_string());

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let deps = Arc::clone(&deps);
        Box::pin(async move {
            if let Err(e) = sweep_due(deps.as_ref()).await {
                tracing::error!(error = %e, "scheduler: campaign sweep failed");
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(%cron, "scheduler: campaign sweep registered");
    Ok(())
}
