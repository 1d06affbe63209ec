use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(in crate::api) struct CampaignsQuery {
    /// Optional store slug filter.
    store: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct CampaignSummaryItem {
    pub campaign_id: Uuid,
    pub store_id: i64,
    pub name: String,
    pub status: String,
    pub frequency: String,
    pub topic: String,
    pub articles_generated: i32,
    pub articles_published: i32,
    pub last_execution: Option<DateTime<Utc>>,
    pub next_execution: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub(in crate::api) async fn list_campaigns(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CampaignsQuery>,
) -> Result<Json<ApiResponse<Vec<CampaignSummaryItem>>>, ApiError> {
    let rid = &req_id.0;
    let limit = normalize_limit(query.limit);

    let store_id = match query.store.as_deref() {
        Some(slug) => {
            let store = blogsmith_db::get_store_by_slug(&state.pool, slug)
                .await
                .map_err(|e| map_db_error(rid.clone(), &e))?
                .ok_or_else(|| {
                    ApiError::new(rid.clone(), "not_found", format!("store '{slug}' not found"))
                })?;
            Some(store.id)
        }
        None => None,
    };

    let rows = blogsmith_db::list_campaigns(&state.pool, store_id, limit)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let items = rows
        .into_iter()
        .map(|row| CampaignSummaryItem {
            campaign_id: row.public_id,
            store_id: row.store_id,
            name: row.name,
            status: row.status,
            frequency: row.frequency,
            topic: row.topic,
            articles_generated: row.articles_generated,
            articles_published: row.articles_published,
            last_execution: row.last_execution,
            next_execution: row.next_execution,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(rid.clone()),
    }))
}
