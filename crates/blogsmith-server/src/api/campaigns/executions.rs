use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use super::resolve_campaign;

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ExecutionsQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct ExecutionItem {
    pub id: i64,
    pub executed_at: DateTime<Utc>,
    pub status: String,
    pub trigger_source: String,
    pub articles_generated: i32,
    pub products_enriched: i32,
    pub products_skipped: i32,
    pub error_message: Option<String>,
}

/// GET /api/v1/campaigns/:public_id/executions — run history, newest first.
pub(in crate::api) async fn list_campaign_executions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<String>,
    Query(query): Query<ExecutionsQuery>,
) -> Result<Json<ApiResponse<Vec<ExecutionItem>>>, ApiError> {
    let rid = &req_id.0;
    let row = resolve_campaign(&state.pool, rid, &public_id).await?;
    let limit = normalize_limit(query.limit);

    let rows = blogsmith_db::list_executions(&state.pool, row.id, limit)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let items = rows
        .into_iter()
        .map(|entry| ExecutionItem {
            id: entry.id,
            executed_at: entry.executed_at,
            status: entry.status,
            trigger_source: entry.trigger_source,
            articles_generated: entry.articles_generated,
            products_enriched: entry.products_enriched,
            products_skipped: entry.products_skipped,
            error_message: entry.error_message,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    }))
}
