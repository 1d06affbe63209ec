//! Generation commands: single-campaign runs and the due-campaign sweep.
//!
//! Both build the production collaborator set from app config, so they need
//! `OPENAI_API_KEY` in the environment even when nothing ends up generating.

use sqlx::PgPool;
use uuid::Uuid;

use blogsmith_core::{AppConfig, TriggerSource};
use blogsmith_db::{CampaignRow, DbError};
use blogsmith_engine::EngineDeps;

/// Resolve a campaign argument (public id) to its row.
///
/// # Errors
///
/// Returns an error when the argument is not a UUID or no campaign has it.
pub(crate) async fn load_campaign(pool: &PgPool, raw: &str) -> anyhow::Result<CampaignRow> {
    let public_id =
        Uuid::parse_str(raw).map_err(|_| anyhow::anyhow!("'{raw}' is not a valid campaign id"))?;

    blogsmith_db::get_campaign_by_public_id(pool, public_id)
        .await
        .map_err(|e| match e {
            DbError::NotFound => anyhow::anyhow!("campaign '{raw}' not found"),
            other => other.into(),
        })
}

/// Run one generation cycle for the named campaign and print the outcome.
///
/// # Errors
///
/// Returns an error when the campaign does not resolve, the collaborators
/// cannot be built, or the cycle is rejected (not active, already running)
/// or fails on infrastructure.
pub(crate) async fn run_one(pool: &PgPool, config: &AppConfig, campaign: &str) -> anyhow::Result<()> {
    let row = load_campaign(pool, campaign).await?;

    let deps = EngineDeps::production(pool.clone(), config)?;
    let outcome = blogsmith_engine::run_campaign(&deps, row.id, TriggerSource::Manual).await?;

    println!("campaign {}: {}", row.public_id, outcome.status);
    if let Some(article) = &outcome.article {
        println!(
            "  article {} \"{}\" ({}, score {})",
            article.public_id, article.title, article.status, article.quality_score
        );
    }
    println!(
        "  products: {} enriched, {} skipped",
        outcome.products_enriched, outcome.products_skipped
    );
    if let Some(message) = &outcome.error_message {
        eprintln!("  error: {message}");
    }

    Ok(())
}

/// Run one due-campaign sweep and print the tally.
///
/// # Errors
///
/// Returns an error when the collaborators cannot be built or the due query
/// fails. Per-campaign failures are absorbed into the tally, not propagated.
pub(crate) async fn run_sweep(pool: &PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let deps = EngineDeps::production(pool.clone(), config)?;
    let summary = blogsmith_engine::sweep_due(&deps).await?;

    if summary.due == 0 {
        println!("no campaigns due");
        return Ok(());
    }
    println!(
        "{} due: {} succeeded, {} partial, {} failed, {} skipped, {} errored",
        summary.due,
        summary.succeeded,
        summary.partial,
        summary.failed,
        summary.skipped,
        summary.errors
    );

    Ok(())
}
