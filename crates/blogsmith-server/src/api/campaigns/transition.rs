use axum::{
    extract::{Path, State},
    Extension, Json,
};
use blogsmith_core::CampaignEvent;
use blogsmith_db::DbError;
use chrono::Utc;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use super::{activation_slot, campaign_detail, resolve_campaign, CampaignDetail};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct TransitionRequest {
    pub event: CampaignEvent,
}

/// POST /api/v1/campaigns/:public_id/transition — apply a lifecycle event.
///
/// The state machine decides the target status; disallowed events come back
/// as 409 so callers can distinguish them from malformed requests. Entering
/// `active` computes the first run slot; leaving it keeps the stored slot,
/// which the next activation overwrites.
pub(in crate::api) async fn transition_campaign(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<String>,
    Json(body): Json<TransitionRequest>,
) -> Result<Json<ApiResponse<CampaignDetail>>, ApiError> {
    let rid = &req_id.0;
    let row = resolve_campaign(&state.pool, rid, &public_id).await?;

    let from = row
        .status_enum()
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    let to = from
        .apply(body.event)
        .map_err(|e| ApiError::new(rid.clone(), "conflict", e.to_string()))?;

    let next_execution = match body.event {
        CampaignEvent::Activate | CampaignEvent::Resume => {
            let settings = row
                .settings()
                .map_err(|e| map_db_error(rid.clone(), &e))?;
            Some(activation_slot(&settings, Utc::now()))
        }
        CampaignEvent::Pause | CampaignEvent::Stop | CampaignEvent::Complete => None,
    };

    blogsmith_db::update_campaign_status(&state.pool, row.id, from, to, next_execution)
        .await
        .map_err(|e| match e {
            DbError::StaleCampaignStatus { .. } => {
                ApiError::new(rid.clone(), "conflict", e.to_string())
            }
            other => map_db_error(rid.clone(), &other),
        })?;

    tracing::info!(
        campaign_id = %row.public_id,
        event = %body.event,
        from = %from,
        to = %to,
        "campaign transitioned"
    );

    let fresh = blogsmith_db::get_campaign(&state.pool, row.id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: campaign_detail(fresh),
        meta: ResponseMeta::new(req_id.0),
    }))
}
