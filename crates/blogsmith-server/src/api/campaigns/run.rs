use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use blogsmith_core::TriggerSource;
use blogsmith_engine::{run_campaign, CycleOutcome, EngineDeps, EngineError};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::super::{ApiError, ApiResponse, AppState, ResponseMeta};
use super::resolve_campaign;

/// Outcome summary for a manually triggered generation cycle.
#[derive(Debug, Serialize)]
pub(in crate::api) struct RunOutcomeData {
    pub campaign_id: Uuid,
    /// `success`, `failed`, or `partial` — the status logged for the run.
    pub status: String,
    pub article_id: Option<Uuid>,
    pub article_status: Option<String>,
    pub quality_score: Option<i32>,
    pub products_enriched: i32,
    pub products_skipped: i32,
    pub error_message: Option<String>,
}

fn run_outcome_data(campaign_public_id: Uuid, outcome: CycleOutcome) -> RunOutcomeData {
    RunOutcomeData {
        campaign_id: campaign_public_id,
        status: outcome.status.to_string(),
        article_id: outcome.article.as_ref().map(|a| a.public_id),
        article_status: outcome.article.as_ref().map(|a| a.status.clone()),
        quality_score: outcome.article.as_ref().map(|a| a.quality_score),
        products_enriched: outcome.products_enriched,
        products_skipped: outcome.products_skipped,
        error_message: outcome.error_message,
    }
}

/// POST /api/v1/campaigns/:public_id/run — run one generation cycle now.
///
/// The cycle executes inline and the response carries its outcome, including
/// failed and needs-review runs. Only a held generation lock or a non-active
/// status rejects the request; those attempts leave no execution log entry.
pub(in crate::api) async fn trigger_campaign_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<RunOutcomeData>>), ApiError> {
    let rid = &req_id.0;
    let row = resolve_campaign(&state.pool, rid, &public_id).await?;

    let deps = EngineDeps::production(state.pool.clone(), &state.config).map_err(|e| match e {
        EngineError::MissingWriterKey => ApiError::new(rid.clone(), "unavailable", e.to_string()),
        other => {
            tracing::error!(error = %other, "failed to wire generation collaborators");
            ApiError::new(rid.clone(), "internal_error", "generation setup failed")
        }
    })?;

    let outcome = run_campaign(&deps, row.id, TriggerSource::Manual)
        .await
        .map_err(|e| match e {
            EngineError::AlreadyRunning { .. } | EngineError::NotActive { .. } => {
                ApiError::new(rid.clone(), "conflict", e.to_string())
            }
            other => {
                tracing::error!(campaign_id = %row.public_id, error = %other, "manual run failed");
                ApiError::new(rid.clone(), "internal_error", "generation cycle failed")
            }
        })?;

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse {
            data: run_outcome_data(row.public_id, outcome),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
