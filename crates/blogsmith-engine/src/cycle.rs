//! One generation cycle for one campaign.
//!
//! 1. Claim the persisted per-campaign lock (single winner).
//! 2. Re-load the campaign and verify it is still active.
//! 3. Select products: fetch the catalog and score against the campaign's
//!    keywords and topic (skipped entirely when product links are off).
//! 4. Generate the article through the writer collaborator.
//! 5. Merge product attribute blocks into the returned HTML.
//! 6. Validate the merged HTML against the campaign's word-count window.
//! 7. Persist the article; failed validation stores it as `needs_review`.
//! 8. Publish via the hook when `auto_publish` is set and validation passed.
//! 9. Advance the schedule, bump counters, clear the lock in one statement.
//! 10. Append exactly one execution log entry.
//!
//! Collaborator failures in steps 3-4 end the cycle with a `failed` log
//! entry and an advanced schedule; nothing earlier than the claim writes
//! any state.

use blogsmith_content::{
    has_product_card, has_product_link, merge, select_products, validate_generated, Selection,
};
use blogsmith_core::{
    advance_after_run, ArticleStatus, CampaignSettings, CampaignStatus, ExecutionStatus, Product,
    ProductLink, TriggerSource,
};
use blogsmith_db::{
    append_execution, claim_generation_lock, complete_campaign_run, get_campaign, get_store,
    insert_article, mark_article_published, release_generation_lock, ArticleRow, CampaignRow,
    CampaignRunOutcome, DbError, NewArticle, NewExecutionLogEntry,
};
use blogsmith_writer::ArticleRequest;
use chrono::{DateTime, Utc};

use crate::deps::{ArticleWriter, Catalog, EngineDeps, PublishHook};
use crate::EngineError;

/// Products put in front of the writer when internal linking imposes no
/// budget of its own.
const DEFAULT_SELECTION_LIMIT: usize = 5;

/// What one attempted cycle produced.
#[derive(Debug)]
pub struct CycleOutcome {
    pub campaign_id: i64,
    pub status: ExecutionStatus,
    /// The stored article, absent for `failed` cycles.
    pub article: Option<ArticleRow>,
    pub products_enriched: i32,
    pub products_skipped: i32,
    pub error_message: Option<String>,
}

/// Run one generation cycle for `campaign_id`.
///
/// # Errors
///
/// - [`EngineError::NotActive`] — the campaign is not in `active` status;
///   nothing is written, not even a log entry.
/// - [`EngineError::AlreadyRunning`] — the generation lock is held.
/// - [`EngineError::Db`] / [`EngineError::Encode`] — infrastructure
///   failures; the lock is released on a best-effort basis.
///
/// Collaborator failures (catalog, writer) are NOT errors: they produce an
/// `Ok` outcome with `status == failed` and an execution log entry.
pub async fn run_campaign<C, W, P>(
    deps: &EngineDeps<C, W, P>,
    campaign_id: i64,
    trigger: TriggerSource,
) -> Result<CycleOutcome, EngineError>
where
    C: Catalog,
    W: ArticleWriter,
    P: PublishHook,
{
    let row = get_campaign(&deps.pool, campaign_id).await?;
    let status = row.status_enum()?;
    if status != CampaignStatus::Active {
        return Err(EngineError::NotActive {
            campaign_id,
            status: row.status,
        });
    }

    let now = Utc::now();
    match claim_generation_lock(&deps.pool, campaign_id, now, deps.config.lock_ttl_secs).await {
        Ok(()) => {}
        Err(DbError::LockNotAcquired { .. }) => {
            return Err(EngineError::AlreadyRunning { campaign_id });
        }
        Err(err) => return Err(err.into()),
    }

    match run_claimed(deps, campaign_id, trigger, now).await {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            release_lock_best_effort(&deps.pool, campaign_id).await;
            Err(err)
        }
    }
}

async fn run_claimed<C, W, P>(
    deps: &EngineDeps<C, W, P>,
    campaign_id: i64,
    trigger: TriggerSource,
    now: DateTime<Utc>,
) -> Result<CycleOutcome, EngineError>
where
    C: Catalog,
    W: ArticleWriter,
    P: PublishHook,
{
    // Re-load: the pre-claim read may be stale by the time the lock is held.
    let row = get_campaign(&deps.pool, campaign_id).await?;
    let settings = row.settings()?;
    let store = get_store(&deps.pool, row.store_id).await?;

    let selection = if settings.product_links {
        let catalog = match deps.catalog.fetch_catalog(&store.base_url).await {
            Ok(products) => products,
            Err(err) => {
                let message = format!("catalog fetch failed: {err}");
                return fail_cycle(deps, &row, &settings, trigger, now, message).await;
            }
        };
        if catalog.is_empty() {
            let message = "no products available for product linking".to_string();
            return fail_cycle(deps, &row, &settings, trigger, now, message).await;
        }
        select_products(
            &settings.keywords,
            &settings.topic,
            &catalog,
            selection_limit(&settings),
        )
    } else {
        Selection {
            products: Vec::new(),
            fallback: false,
        }
    };
    if selection.fallback {
        tracing::warn!(
            campaign_id,
            "no product matched the campaign keywords; selection fell back to catalog order"
        );
    }

    let request = ArticleRequest {
        settings: &settings,
        products: &selection.products,
        store_base_url: &store.base_url,
    };
    let generated = match deps.writer.generate_article(&request).await {
        Ok(article) => article,
        Err(err) => {
            let message = format!("article generation failed: {err}");
            return fail_cycle(deps, &row, &settings, trigger, now, message).await;
        }
    };

    let merged = merge(&generated.html_body, &selection.products);
    let report = validate_generated(
        &merged.html,
        settings.word_count_min,
        settings.word_count_max,
        selection.fallback,
    );

    // Article metadata only lists products whose card or product-page link
    // actually survived into the final HTML.
    let linked: Vec<&Product> = selection
        .products
        .iter()
        .filter(|p| {
            has_product_card(&merged.html, &p.handle) || has_product_link(&merged.html, &p.handle)
        })
        .collect();
    let product_links: Vec<ProductLink> = linked
        .iter()
        .map(|p| ProductLink::for_product(p))
        .collect();

    let article_status = if report.passed {
        ArticleStatus::Draft
    } else {
        ArticleStatus::NeedsReview
    };
    let new_article = NewArticle {
        campaign_id: Some(row.id),
        store_id: row.store_id,
        title: generated.title.clone(),
        meta_description: generated.meta_description.clone(),
        body_html: merged.html.clone(),
        keywords: settings.keywords.clone(),
        category: linked.first().and_then(|p| p.category.clone()),
        subcategory: linked.first().and_then(|p| p.subcategory.clone()),
        language: settings.language.clone(),
        word_count: i32::try_from(report.word_count).unwrap_or(i32::MAX),
        status: article_status,
        quality_score: report.score,
        validation_issues: serde_json::Value::from(report.issues.clone()),
        product_links: serde_json::to_value(&product_links)?,
    };
    let mut article = insert_article(&deps.pool, &new_article).await?;

    let mut published_delta = 0;
    if settings.auto_publish && report.passed {
        match deps.publisher.publish(&article).await {
            Ok(()) => {
                mark_article_published(&deps.pool, article.id).await?;
                article.status = ArticleStatus::Published.to_string();
                published_delta = 1;
            }
            Err(err) => {
                tracing::warn!(
                    campaign_id,
                    article_id = article.id,
                    error = %err,
                    "publish hook failed; article kept unpublished"
                );
            }
        }
    }

    let next_slot = next_slot_after(now, &settings);
    complete_campaign_run(
        &deps.pool,
        row.id,
        &CampaignRunOutcome {
            last_execution: now,
            next_execution: next_slot,
            generated_delta: 1,
            published_delta,
            mark_completed: run_window_closed(&settings, row.articles_generated + 1, next_slot),
        },
    )
    .await?;

    let (status, error_message) = if report.passed {
        (ExecutionStatus::Success, None)
    } else {
        (
            ExecutionStatus::Partial,
            Some(format!(
                "validation failed with score {}: {}",
                report.score,
                report.issues.join("; ")
            )),
        )
    };
    append_execution(
        &deps.pool,
        &NewExecutionLogEntry {
            campaign_id: row.id,
            status,
            trigger_source: trigger,
            articles_generated: 1,
            products_enriched: clamp_count(merged.enriched),
            products_skipped: clamp_count(merged.skipped),
            error_message: error_message.clone(),
        },
    )
    .await?;

    tracing::info!(
        campaign_id,
        article_id = article.id,
        score = report.score,
        status = %status,
        "generation cycle finished"
    );

    Ok(CycleOutcome {
        campaign_id: row.id,
        status,
        article: Some(article),
        products_enriched: clamp_count(merged.enriched),
        products_skipped: clamp_count(merged.skipped),
        error_message,
    })
}

/// End a cycle that produced no article: advance the schedule, clear the
/// lock, and record a `failed` log entry.
async fn fail_cycle<C, W, P>(
    deps: &EngineDeps<C, W, P>,
    row: &CampaignRow,
    settings: &CampaignSettings,
    trigger: TriggerSource,
    now: DateTime<Utc>,
    message: String,
) -> Result<CycleOutcome, EngineError>
where
    C: Catalog,
    W: ArticleWriter,
    P: PublishHook,
{
    let next_slot = next_slot_after(now, settings);
    complete_campaign_run(
        &deps.pool,
        row.id,
        &CampaignRunOutcome {
            last_execution: now,
            next_execution: next_slot,
            generated_delta: 0,
            published_delta: 0,
            mark_completed: run_window_closed(settings, row.articles_generated, next_slot),
        },
    )
    .await?;
    append_execution(
        &deps.pool,
        &NewExecutionLogEntry {
            campaign_id: row.id,
            status: ExecutionStatus::Failed,
            trigger_source: trigger,
            articles_generated: 0,
            products_enriched: 0,
            products_skipped: 0,
            error_message: Some(message.clone()),
        },
    )
    .await?;

    tracing::warn!(campaign_id = row.id, error = %message, "generation cycle failed");

    Ok(CycleOutcome {
        campaign_id: row.id,
        status: ExecutionStatus::Failed,
        article: None,
        products_enriched: 0,
        products_skipped: 0,
        error_message: Some(message),
    })
}

async fn release_lock_best_effort(pool: &sqlx::PgPool, campaign_id: i64) {
    if let Err(err) = release_generation_lock(pool, campaign_id).await {
        tracing::error!(campaign_id, error = %err, "failed to release generation lock");
    }
}

fn selection_limit(settings: &CampaignSettings) -> usize {
    if settings.internal_linking {
        usize::try_from(settings.max_internal_links.clamp(1, 10))
            .unwrap_or(DEFAULT_SELECTION_LIMIT)
    } else {
        DEFAULT_SELECTION_LIMIT
    }
}

/// The slot one period after this run, in the campaign's UTC clock.
fn next_slot_after(now: DateTime<Utc>, settings: &CampaignSettings) -> DateTime<Utc> {
    advance_after_run(
        now.naive_utc(),
        settings.frequency,
        settings.schedule_time,
        settings.schedule_day,
    )
    .and_utc()
}

/// Whether the campaign has no future runs left: the next slot falls past
/// `end_date`, or the generated-article cap is reached.
fn run_window_closed(
    settings: &CampaignSettings,
    articles_generated: i32,
    next_slot: DateTime<Utc>,
) -> bool {
    let past_end = settings
        .end_date
        .is_some_and(|end| next_slot.date_naive() > end);
    let cap_reached = settings.max_runs.is_some_and(|cap| articles_generated >= cap);
    past_end || cap_reached
}

fn clamp_count(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use blogsmith_core::Frequency;
    use chrono::{NaiveDate, NaiveTime, TimeZone};

    use super::*;

    fn settings_with(end_date: Option<NaiveDate>, max_runs: Option<i32>) -> CampaignSettings {
        CampaignSettings {
            name: "Window Check".to_string(),
            description: None,
            frequency: Frequency::Daily,
            schedule_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            schedule_day: None,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date,
            max_runs,
            topic: "patio".to_string(),
            keywords: vec!["bench".to_string()],
            word_count_min: 500,
            word_count_max: 900,
            writing_style: "informative".to_string(),
            tone: "neutral".to_string(),
            content_structure: None,
            language: "en".to_string(),
            internal_linking: true,
            max_internal_links: 3,
            image_integration: false,
            product_links: true,
            seo_optimization: true,
            auto_publish: false,
        }
    }

    #[test]
    fn window_stays_open_without_limits() {
        let settings = settings_with(None, None);
        let next = Utc.with_ymd_and_hms(2025, 3, 10, 6, 0, 0).unwrap();
        assert!(!run_window_closed(&settings, 100, next));
    }

    #[test]
    fn window_closes_when_next_slot_passes_end_date() {
        let end = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let settings = settings_with(Some(end), None);
        let next = Utc.with_ymd_and_hms(2025, 3, 10, 6, 0, 0).unwrap();
        assert!(run_window_closed(&settings, 1, next));

        let next_on_end = Utc.with_ymd_and_hms(2025, 3, 9, 6, 0, 0).unwrap();
        assert!(
            !run_window_closed(&settings, 1, next_on_end),
            "a slot on the end date itself still runs"
        );
    }

    #[test]
    fn window_closes_at_article_cap() {
        let settings = settings_with(None, Some(3));
        let next = Utc.with_ymd_and_hms(2025, 3, 10, 6, 0, 0).unwrap();
        assert!(!run_window_closed(&settings, 2, next));
        assert!(run_window_closed(&settings, 3, next));
    }

    #[test]
    fn selection_limit_follows_link_budget() {
        let mut settings = settings_with(None, None);
        assert_eq!(selection_limit(&settings), 3);

        settings.max_internal_links = 25;
        assert_eq!(selection_limit(&settings), 10, "budget is capped at 10");

        settings.internal_linking = false;
        assert_eq!(selection_limit(&settings), DEFAULT_SELECTION_LIMIT);
    }
}
