//! Database operations for the `campaigns` table.
//!
//! Status changes and the generation lock both go through conditional
//! `UPDATE ... WHERE` statements so that concurrent writers cannot race each
//! other into an illegal state; `rows_affected() == 0` is the signal that
//! somebody else got there first.

use blogsmith_core::{CampaignSettings, CampaignStatus, Frequency};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const CAMPAIGN_COLUMNS: &str =
    "id, public_id, store_id, name, description, status, frequency, schedule_time, \
     schedule_day, start_date, end_date, max_runs, topic, keywords, word_count_min, \
     word_count_max, writing_style, tone, content_structure, language, internal_linking, \
     max_internal_links, image_integration, product_links, seo_optimization, auto_publish, \
     articles_generated, articles_published, last_execution, next_execution, \
     generation_lock_at, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `campaigns` table.
///
/// The feature toggles are independent per-campaign switches, one column
/// each; the boolean count mirrors the schema.
#[derive(Debug, Clone, sqlx::FromRow)]
#[allow(clippy::struct_excessive_bools)]
pub struct CampaignRow {
    pub id: i64,
    pub public_id: Uuid,
    pub store_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub frequency: String,
    pub schedule_time: NaiveTime,
    pub schedule_day: Option<i16>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub max_runs: Option<i32>,
    pub topic: String,
    pub keywords: Vec<String>,
    pub word_count_min: i32,
    pub word_count_max: i32,
    pub writing_style: String,
    pub tone: String,
    pub content_structure: Option<String>,
    pub language: String,
    pub internal_linking: bool,
    pub max_internal_links: i32,
    pub image_integration: bool,
    pub product_links: bool,
    pub seo_optimization: bool,
    pub auto_publish: bool,
    pub articles_generated: i32,
    pub articles_published: i32,
    pub last_execution: Option<DateTime<Utc>>,
    pub next_execution: Option<DateTime<Utc>>,
    pub generation_lock_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CampaignRow {
    /// The stored status as the domain enum.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MalformedRow`] if the column holds a value outside
    /// the schema's CHECK list.
    pub fn status_enum(&self) -> Result<CampaignStatus, DbError> {
        self.status.parse().map_err(|_| DbError::MalformedRow {
            id: self.id,
            field: "status",
        })
    }

    /// Reconstruct the operator-editable settings from the row, for feeding
    /// back into scheduling, prompting, and validation.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MalformedRow`] if a stored column cannot be parsed
    /// into its domain type.
    pub fn settings(&self) -> Result<CampaignSettings, DbError> {
        let frequency: Frequency = self.frequency.parse().map_err(|_| DbError::MalformedRow {
            id: self.id,
            field: "frequency",
        })?;
        let schedule_day = self
            .schedule_day
            .map(|day| {
                u8::try_from(day).map_err(|_| DbError::MalformedRow {
                    id: self.id,
                    field: "schedule_day",
                })
            })
            .transpose()?;

        Ok(CampaignSettings {
            name: self.name.clone(),
            description: self.description.clone(),
            frequency,
            schedule_time: self.schedule_time,
            schedule_day,
            start_date: self.start_date,
            end_date: self.end_date,
            max_runs: self.max_runs,
            topic: self.topic.clone(),
            keywords: self.keywords.clone(),
            word_count_min: self.word_count_min,
            word_count_max: self.word_count_max,
            writing_style: self.writing_style.clone(),
            tone: self.tone.clone(),
            content_structure: self.content_structure.clone(),
            language: self.language.clone(),
            internal_linking: self.internal_linking,
            max_internal_links: self.max_internal_links,
            image_integration: self.image_integration,
            product_links: self.product_links,
            seo_optimization: self.seo_optimization,
            auto_publish: self.auto_publish,
        })
    }
}

/// Payload for [`create_campaign`]. Settings are validated in
/// `blogsmith-core` before they get here.
#[derive(Debug, Clone, Copy)]
pub struct NewCampaign<'a> {
    pub store_id: i64,
    pub settings: &'a CampaignSettings,
    /// Initial status; campaigns may be created directly in `active`.
    pub status: CampaignStatus,
    /// First run slot, already computed by the caller for active campaigns.
    pub next_execution: Option<DateTime<Utc>>,
}

/// Counter and schedule updates applied when a generation cycle finishes.
#[derive(Debug, Clone, Copy)]
pub struct CampaignRunOutcome {
    pub last_execution: DateTime<Utc>,
    pub next_execution: DateTime<Utc>,
    pub generated_delta: i32,
    pub published_delta: i32,
    /// Flip the campaign to `completed` (end date passed or the generated
    /// article cap was reached).
    pub mark_completed: bool,
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Insert a campaign and return the full new row.
///
/// Generates the `public_id` UUID in Rust and binds it.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_campaign(pool: &PgPool, new: &NewCampaign<'_>) -> Result<CampaignRow, DbError> {
    let public_id = Uuid::new_v4();
    let settings = new.settings;

    let sql = format!(
        "INSERT INTO campaigns (public_id, store_id, name, description, status, frequency, \
             schedule_time, schedule_day, start_date, end_date, max_runs, topic, keywords, \
             word_count_min, word_count_max, writing_style, tone, content_structure, language, \
             internal_linking, max_internal_links, image_integration, product_links, \
             seo_optimization, auto_publish, next_execution) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 $18, $19, $20, $21, $22, $23, $24, $25, $26) \
         RETURNING {CAMPAIGN_COLUMNS}"
    );

    let row = sqlx::query_as::<_, CampaignRow>(&sql)
        .bind(public_id)
        .bind(new.store_id)
        .bind(&settings.name)
        .bind(&settings.description)
        .bind(new.status.to_string())
        .bind(settings.frequency.to_string())
        .bind(settings.schedule_time)
        .bind(settings.schedule_day.map(i16::from))
        .bind(settings.start_date)
        .bind(settings.end_date)
        .bind(settings.max_runs)
        .bind(&settings.topic)
        .bind(&settings.keywords)
        .bind(settings.word_count_min)
        .bind(settings.word_count_max)
        .bind(&settings.writing_style)
        .bind(&settings.tone)
        .bind(&settings.content_structure)
        .bind(&settings.language)
        .bind(settings.internal_linking)
        .bind(settings.max_internal_links)
        .bind(settings.image_integration)
        .bind(settings.product_links)
        .bind(settings.seo_optimization)
        .bind(settings.auto_publish)
        .bind(new.next_execution)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Fetch a campaign by internal id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches, [`DbError::Sqlx`] on
/// query failure.
pub async fn get_campaign(pool: &PgPool, id: i64) -> Result<CampaignRow, DbError> {
    let sql = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1");

    sqlx::query_as::<_, CampaignRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Fetch a campaign by its public UUID, as used in API paths.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches, [`DbError::Sqlx`] on
/// query failure.
pub async fn get_campaign_by_public_id(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<CampaignRow, DbError> {
    let sql = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE public_id = $1");

    sqlx::query_as::<_, CampaignRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// List campaigns, newest first, optionally narrowed to one store.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_campaigns(
    pool: &PgPool,
    store_id: Option<i64>,
    limit: i64,
) -> Result<Vec<CampaignRow>, DbError> {
    let sql = format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM campaigns \
         WHERE ($1::bigint IS NULL OR store_id = $1) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    );

    let rows = sqlx::query_as::<_, CampaignRow>(&sql)
        .bind(store_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Overwrite the operator-editable settings and the recomputed run slot.
///
/// `next_execution` is stored as given: callers pass the recomputed slot for
/// active campaigns and `None` for campaigns that have never been activated.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches, [`DbError::Sqlx`] on
/// query failure.
pub async fn update_campaign_config(
    pool: &PgPool,
    id: i64,
    settings: &CampaignSettings,
    next_execution: Option<DateTime<Utc>>,
) -> Result<CampaignRow, DbError> {
    let sql = format!(
        "UPDATE campaigns SET \
             name = $2, description = $3, frequency = $4, schedule_time = $5, \
             schedule_day = $6, start_date = $7, end_date = $8, max_runs = $9, topic = $10, \
             keywords = $11, word_count_min = $12, word_count_max = $13, writing_style = $14, \
             tone = $15, content_structure = $16, language = $17, internal_linking = $18, \
             max_internal_links = $19, image_integration = $20, product_links = $21, \
             seo_optimization = $22, auto_publish = $23, next_execution = $24, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {CAMPAIGN_COLUMNS}"
    );

    sqlx::query_as::<_, CampaignRow>(&sql)
        .bind(id)
        .bind(&settings.name)
        .bind(&settings.description)
        .bind(settings.frequency.to_string())
        .bind(settings.schedule_time)
        .bind(settings.schedule_day.map(i16::from))
        .bind(settings.start_date)
        .bind(settings.end_date)
        .bind(settings.max_runs)
        .bind(&settings.topic)
        .bind(&settings.keywords)
        .bind(settings.word_count_min)
        .bind(settings.word_count_max)
        .bind(&settings.writing_style)
        .bind(&settings.tone)
        .bind(&settings.content_structure)
        .bind(&settings.language)
        .bind(settings.internal_linking)
        .bind(settings.max_internal_links)
        .bind(settings.image_integration)
        .bind(settings.product_links)
        .bind(settings.seo_optimization)
        .bind(settings.auto_publish)
        .bind(next_execution)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Move a campaign from `from` to `to`, conditionally on the stored status.
///
/// `next_execution` is only written when `Some` (activation passes the
/// freshly computed slot; pause/stop leave the column alone). The caller has
/// already validated the transition against the state machine; the SQL guard
/// closes the race with concurrent writers.
///
/// # Errors
///
/// Returns [`DbError::StaleCampaignStatus`] if the row is no longer in
/// `from`, [`DbError::Sqlx`] on query failure.
pub async fn update_campaign_status(
    pool: &PgPool,
    id: i64,
    from: CampaignStatus,
    to: CampaignStatus,
    next_execution: Option<DateTime<Utc>>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE campaigns \
         SET status = $3, next_execution = COALESCE($4, next_execution), updated_at = NOW() \
         WHERE id = $1 AND status = $2",
    )
    .bind(id)
    .bind(from.to_string())
    .bind(to.to_string())
    .bind(next_execution)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::StaleCampaignStatus { id, expected: from });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Scheduling and the generation lock
// ---------------------------------------------------------------------------

/// Active campaigns whose run slot has arrived and that are not currently
/// mid-generation. A lock older than `lock_ttl_secs` counts as abandoned
/// (crashed worker) and the campaign becomes eligible again.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_due_campaigns(
    pool: &PgPool,
    now: DateTime<Utc>,
    lock_ttl_secs: i64,
    limit: i64,
) -> Result<Vec<CampaignRow>, DbError> {
    let sql = format!(
        "SELECT {CAMPAIGN_COLUMNS} FROM campaigns \
         WHERE status = 'active' \
           AND next_execution IS NOT NULL \
           AND next_execution <= $1 \
           AND (generation_lock_at IS NULL \
                OR generation_lock_at < $1 - ($2 * INTERVAL '1 second')) \
         ORDER BY next_execution, id \
         LIMIT $3"
    );

    let rows = sqlx::query_as::<_, CampaignRow>(&sql)
        .bind(now)
        .bind(lock_ttl_secs)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Claim the per-campaign generation lock.
///
/// A single conditional UPDATE: the row must be `active` and either unlocked
/// or holding a lock older than `lock_ttl_secs`. At most one caller wins per
/// cycle, across every orchestrator instance sharing the database.
///
/// # Errors
///
/// Returns [`DbError::LockNotAcquired`] if the lock is already held (or the
/// campaign is not active), [`DbError::Sqlx`] on query failure.
pub async fn claim_generation_lock(
    pool: &PgPool,
    id: i64,
    now: DateTime<Utc>,
    lock_ttl_secs: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE campaigns \
         SET generation_lock_at = $2, updated_at = NOW() \
         WHERE id = $1 \
           AND status = 'active' \
           AND (generation_lock_at IS NULL \
                OR generation_lock_at < $2 - ($3 * INTERVAL '1 second'))",
    )
    .bind(id)
    .bind(now)
    .bind(lock_ttl_secs)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::LockNotAcquired { campaign_id: id });
    }

    Ok(())
}

/// Release the generation lock without touching anything else. Used on the
/// failure paths that do not go through [`complete_campaign_run`]; releasing
/// an already-clear lock is a no-op.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn release_generation_lock(pool: &PgPool, id: i64) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE campaigns \
         SET generation_lock_at = NULL, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Finish a generation cycle in one statement: record the run times, bump
/// the counters, optionally flip to `completed`, and clear the lock.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the campaign row vanished mid-cycle,
/// [`DbError::Sqlx`] on query failure.
pub async fn complete_campaign_run(
    pool: &PgPool,
    id: i64,
    outcome: &CampaignRunOutcome,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE campaigns \
         SET last_execution = $2, \
             next_execution = $3, \
             articles_generated = articles_generated + $4, \
             articles_published = articles_published + $5, \
             status = CASE WHEN $6 THEN 'completed' ELSE status END, \
             generation_lock_at = NULL, \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(outcome.last_execution)
    .bind(outcome.next_execution)
    .bind(outcome.generated_delta)
    .bind(outcome.published_delta)
    .bind(outcome.mark_completed)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}
