//! Campaign create, detail, and settings-update handlers.
//! Lifecycle events and manual runs live in `transition` and `run`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use blogsmith_core::{normalize_keywords, CampaignSettings, CampaignStatus};
use blogsmith_db::NewCampaign;
use chrono::Utc;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use super::{activation_slot, campaign_detail, resolve_campaign, CampaignDetail};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CreateCampaignRequest {
    /// Slug of the store the campaign publishes to.
    pub store: String,
    #[serde(flatten)]
    pub settings: CampaignSettings,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Normalize the keyword list in place and validate the whole settings
/// document. Settings are always validated as a unit so cross-field rules
/// (word count range, schedule day per frequency) hold.
fn normalize_and_validate(
    req_id: &str,
    settings: &mut CampaignSettings,
) -> Result<(), ApiError> {
    settings.keywords = normalize_keywords(&settings.keywords);
    settings
        .validate()
        .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))
}

async fn resolve_store_id(
    pool: &sqlx::PgPool,
    req_id: &str,
    slug: &str,
) -> Result<i64, ApiError> {
    let store = blogsmith_db::get_store_by_slug(pool, slug)
        .await
        .map_err(|e| map_db_error(req_id.to_owned(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id,
                "validation_error",
                format!("unknown store '{slug}'"),
            )
        })?;
    Ok(store.id)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/campaigns — create a campaign in `draft`.
///
/// Draft campaigns are never scheduled; the first run slot is computed when
/// the campaign is activated.
pub(in crate::api) async fn create_campaign(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CampaignDetail>>), ApiError> {
    let rid = &req_id.0;

    let mut settings = body.settings;
    normalize_and_validate(rid, &mut settings)?;
    let store_id = resolve_store_id(&state.pool, rid, &body.store).await?;

    let row = blogsmith_db::create_campaign(
        &state.pool,
        &NewCampaign {
            store_id,
            settings: &settings,
            status: CampaignStatus::Draft,
            next_execution: None,
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(campaign_id = %row.public_id, store = %body.store, "campaign created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: campaign_detail(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// GET /api/v1/campaigns/:public_id — full campaign detail.
pub(in crate::api) async fn get_campaign(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<String>,
) -> Result<Json<ApiResponse<CampaignDetail>>, ApiError> {
    let rid = &req_id.0;
    let row = resolve_campaign(&state.pool, rid, &public_id).await?;

    Ok(Json(ApiResponse {
        data: campaign_detail(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// PATCH /api/v1/campaigns/:public_id — replace the campaign settings.
///
/// The body carries the complete settings document. For active campaigns the
/// next run slot is recomputed from the new schedule; for everything else it
/// is cleared and recomputed at the next activation.
pub(in crate::api) async fn update_campaign(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<String>,
    Json(body): Json<CampaignSettings>,
) -> Result<Json<ApiResponse<CampaignDetail>>, ApiError> {
    let rid = &req_id.0;
    let row = resolve_campaign(&state.pool, rid, &public_id).await?;

    let mut settings = body;
    normalize_and_validate(rid, &mut settings)?;

    let status = row
        .status_enum()
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let next_execution = match status {
        CampaignStatus::Active => Some(activation_slot(&settings, Utc::now())),
        _ => None,
    };

    let updated = blogsmith_db::update_campaign_config(&state.pool, row.id, &settings, next_execution)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(campaign_id = %updated.public_id, "campaign settings updated");

    Ok(Json(ApiResponse {
        data: campaign_detail(updated),
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogsmith_core::Frequency;
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn create_request_flattens_settings_alongside_store() {
        let body = serde_json::json!({
            "store": "garden-works",
            "name": "Spring Planting",
            "frequency": "weekly",
            "schedule_time": "06:30:00",
            "schedule_day": 3,
            "start_date": "2025-03-10",
            "topic": "raised beds",
            "keywords": ["cedar", "compost"],
            "word_count_min": 500,
            "word_count_max": 900,
            "writing_style": "informative",
            "tone": "friendly",
            "language": "en",
            "internal_linking": true,
            "max_internal_links": 3,
            "image_integration": false,
            "product_links": true,
            "seo_optimization": true,
            "auto_publish": false
        });

        let req: CreateCampaignRequest = serde_json::from_value(body).expect("deserialize");
        assert_eq!(req.store, "garden-works");
        assert_eq!(req.settings.name, "Spring Planting");
        assert_eq!(req.settings.frequency, Frequency::Weekly);
        assert_eq!(req.settings.schedule_day, Some(3));
        assert_eq!(
            req.settings.start_date,
            NaiveDate::from_ymd_opt(2025, 3, 10).expect("date")
        );
        assert_eq!(req.settings.end_date, None);
        assert_eq!(req.settings.max_runs, None);
    }

    #[test]
    fn normalize_and_validate_dedupes_keywords() {
        let mut settings = CampaignSettings {
            name: "Dedupe".to_string(),
            description: None,
            frequency: Frequency::Daily,
            schedule_time: NaiveTime::from_hms_opt(6, 0, 0).expect("time"),
            schedule_day: None,
            start_date: NaiveDate::from_ymd_opt(2025, 2, 1).expect("date"),
            end_date: None,
            max_runs: None,
            topic: "gardening".to_string(),
            keywords: vec![
                "Cedar".to_string(),
                "  cedar ".to_string(),
                String::new(),
                "compost".to_string(),
            ],
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
        };

        normalize_and_validate("req-1", &mut settings).expect("valid settings");
        assert_eq!(settings.keywords, vec!["Cedar", "compost"]);
    }

    #[test]
    fn normalize_and_validate_rejects_inverted_word_counts() {
        let mut settings = CampaignSettings {
            name: "Inverted".to_string(),
            description: None,
            frequency: Frequency::Daily,
            schedule_time: NaiveTime::from_hms_opt(6, 0, 0).expect("time"),
            schedule_day: None,
            start_date: NaiveDate::from_ymd_opt(2025, 2, 1).expect("date"),
            end_date: None,
            max_runs: None,
            topic: "gardening".to_string(),
            keywords: vec!["cedar".to_string()],
            word_count_min: 900,
            word_count_max: 500,
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
        };

        let err = normalize_and_validate("req-1", &mut settings).expect_err("should reject");
        assert_eq!(err.error.code, "validation_error");
    }
}
