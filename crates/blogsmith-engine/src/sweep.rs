//! Scheduler sweep: run every due campaign with bounded concurrency.

use blogsmith_core::{ExecutionStatus, TriggerSource};
use blogsmith_db::list_due_campaigns;
use chrono::Utc;
use futures::{stream, StreamExt};

use crate::cycle::run_campaign;
use crate::deps::{ArticleWriter, Catalog, EngineDeps, PublishHook};
use crate::EngineError;

/// Tally of one sweep pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepSummary {
    pub due: usize,
    pub succeeded: usize,
    pub partial: usize,
    pub failed: usize,
    /// Campaigns another worker claimed first, or that left `active` status
    /// between the due query and the claim.
    pub skipped: usize,
    /// Infrastructure errors. The campaign keeps its slot and is picked up
    /// again once its lock expires.
    pub errors: usize,
}

/// Find campaigns whose slot has arrived and run a cycle for each.
///
/// Campaigns run concurrently up to `max_concurrent_campaigns`; one
/// campaign's failure never stops the others. Lock contention is expected
/// under overlapping sweeps and counts as a skip, not an error.
///
/// # Errors
///
/// Returns an error only when the due query itself fails. Per-campaign
/// failures are absorbed into the summary.
pub async fn sweep_due<C, W, P>(deps: &EngineDeps<C, W, P>) -> Result<SweepSummary, EngineError>
where
    C: Catalog,
    W: ArticleWriter,
    P: PublishHook,
{
    let now = Utc::now();
    let due = list_due_campaigns(
        &deps.pool,
        now,
        deps.config.lock_ttl_secs,
        deps.config.due_batch_limit,
    )
    .await?;

    let mut summary = SweepSummary {
        due: due.len(),
        ..SweepSummary::default()
    };
    if due.is_empty() {
        return Ok(summary);
    }
    tracing::info!(due = summary.due, "sweeping due campaigns");

    let max_concurrent = deps.config.max_concurrent_campaigns.max(1);
    let outcomes: Vec<_> = stream::iter(due)
        .map(|campaign| async move {
            let outcome = run_campaign(deps, campaign.id, TriggerSource::Scheduled).await;
            (campaign.id, outcome)
        })
        .buffer_unordered(max_concurrent)
        .collect()
        .await;

    for (campaign_id, outcome) in outcomes {
        match outcome {
            Ok(cycle) => match cycle.status {
                ExecutionStatus::Success => summary.succeeded += 1,
                ExecutionStatus::Partial => summary.partial += 1,
                ExecutionStatus::Failed => summary.failed += 1,
            },
            Err(EngineError::AlreadyRunning { .. }) => {
                tracing::debug!(campaign_id, "generation already in flight; skipped");
                summary.skipped += 1;
            }
            Err(EngineError::NotActive { .. }) => {
                tracing::debug!(campaign_id, "campaign left active status; skipped");
                summary.skipped += 1;
            }
            Err(err) => {
                tracing::error!(campaign_id, error = %err, "campaign cycle errored");
                summary.errors += 1;
            }
        }
    }

    tracing::info!(
        due = summary.due,
        succeeded = summary.succeeded,
        partial = summary.partial,
        failed = summary.failed,
        skipped = summary.skipped,
        errors = summary.errors,
        "sweep finished"
    );
    Ok(summary)
}
