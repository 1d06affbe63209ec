//! Campaign lifecycle API handlers.
//!
//! - `GET /api/v1/campaigns`                          — campaign list
//! - `POST /api/v1/campaigns`                          — create (draft)
//! - `GET /api/v1/campaigns/:public_id`                — full campaign detail
//! - `PATCH /api/v1/campaigns/:public_id`              — settings update
//! - `POST /api/v1/campaigns/:public_id/transition`    — state machine event
//! - `POST /api/v1/campaigns/:public_id/run`           — manual generation cycle
//! - `GET /api/v1/campaigns/:public_id/executions`     — append-only run log

mod executions;
mod list;
mod run;
mod transition;
mod write;

pub(super) use executions::list_campaign_executions;
pub(super) use list::list_campaigns;
pub(super) use run::trigger_campaign_run;
pub(super) use transition::transition_campaign;
pub(super) use write::{create_campaign, get_campaign, update_campaign};

use blogsmith_core::{first_run_at_or_after, CampaignSettings};
use blogsmith_db::CampaignRow;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{map_db_error, parse_public_id, ApiError};

/// Resolve a campaign public id to its row, returning 404 if not found.
async fn resolve_campaign(
    pool: &sqlx::PgPool,
    request_id: &str,
    raw_public_id: &str,
) -> Result<CampaignRow, ApiError> {
    let public_id = parse_public_id(request_id, raw_public_id)?;
    blogsmith_db::get_campaign_by_public_id(pool, public_id)
        .await
        .map_err(|e| match e {
            blogsmith_db::DbError::NotFound => ApiError::new(
                request_id,
                "not_found",
                format!("campaign '{raw_public_id}' not found"),
            ),
            other => map_db_error(request_id.to_owned(), &other),
        })
}

/// First run slot for a campaign entering `active`: never before the
/// configured start date, never in the past.
fn activation_slot(settings: &CampaignSettings, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = settings.start_date.and_time(NaiveTime::MIN);
    let anchor = now.naive_utc().max(floor);
    first_run_at_or_after(
        anchor,
        settings.frequency,
        settings.schedule_time,
        settings.schedule_day,
    )
    .and_utc()
}

/// Full campaign representation returned by detail, create, update, and
/// transition. Internal row ids and the generation lock stay private.
#[derive(Debug, Serialize)]
pub(in crate::api) struct CampaignDetail {
    pub campaign_id: Uuid,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn campaign_detail(row: CampaignRow) -> CampaignDetail {
    CampaignDetail {
        campaign_id: row.public_id,
        store_id: row.store_id,
        name: row.name,
        description: row.description,
        status: row.status,
        frequency: row.frequency,
        schedule_time: row.schedule_time,
        schedule_day: row.schedule_day,
        start_date: row.start_date,
        end_date: row.end_date,
        max_runs: row.max_runs,
        topic: row.topic,
        keywords: row.keywords,
        word_count_min: row.word_count_min,
        word_count_max: row.word_count_max,
        writing_style: row.writing_style,
        tone: row.tone,
        content_structure: row.content_structure,
        language: row.language,
        internal_linking: row.internal_linking,
        max_internal_links: row.max_internal_links,
        image_integration: row.image_integration,
        product_links: row.product_links,
        seo_optimization: row.seo_optimization,
        auto_publish: row.auto_publish,
        articles_generated: row.articles_generated,
        articles_published: row.articles_published,
        last_execution: row.last_execution,
        next_execution: row.next_execution,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogsmith_core::Frequency;

    fn settings_for_slot(frequency: Frequency, schedule_day: Option<u8>) -> CampaignSettings {
        CampaignSettings {
            name: "Slot Test".to_string(),
            description: None,
            frequency,
            schedule_time: NaiveTime::from_hms_opt(6, 30, 0).expect("time"),
            schedule_day,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 10).expect("date"),
            end_date: None,
            max_runs: None,
            topic: "gardening".to_string(),
            keywords: vec!["beds".to_string()],
            word_count_min: 500,
            word_count_max: 900,
            writing_style: "informative".to_string(),
            tone: "friendly".to_string(),
            content_structure: None,
            language: "en".to_string(),
            internal_linking: false,
            max_internal_links: 3,
            image_integration: false,
            product_links: false,
            seo_optimization: false,
            auto_publish: false,
        }
    }

    #[test]
    fn activation_slot_waits_for_the_start_date() {
        let settings = settings_for_slot(Frequency::Daily, None);
        let now = NaiveDate::from_ymd_opt(2025, 3, 1)
            .expect("date")
            .and_hms_opt(12, 0, 0)
            .expect("time")
            .and_utc();

        let slot = activation_slot(&settings, now);
        assert_eq!(slot.date_naive(), settings.start_date);
        assert_eq!(slot.time(), settings.schedule_time);
    }

    #[test]
    fn activation_slot_skips_todays_past_time() {
        let settings = settings_for_slot(Frequency::Daily, None);
        // Past the 06:30 slot on a day after start_date.
        let now = NaiveDate::from_ymd_opt(2025, 4, 2)
            .expect("date")
            .and_hms_opt(9, 0, 0)
            .expect("time")
            .and_utc();

        let slot = activation_slot(&settings, now);
        assert_eq!(
            slot.date_naive(),
            NaiveDate::from_ymd_opt(2025, 4, 3).expect("date")
        );
    }

    #[test]
    fn activation_slot_lands_on_the_scheduled_weekday() {
        // Sunday = 0; ask for Wednesday (3).
        let settings = settings_for_slot(Frequency::Weekly, Some(3));
        let now = NaiveDate::from_ymd_opt(2025, 4, 7) // a Monday
            .expect("date")
            .and_hms_opt(0, 0, 0)
            .expect("time")
            .and_utc();

        let slot = activation_slot(&settings, now);
        assert_eq!(
            slot.date_naive(),
            NaiveDate::from_ymd_opt(2025, 4, 9).expect("date")
        );
    }
}
