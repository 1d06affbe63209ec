//! Generated-article read handlers.
//!
//! - `GET /api/v1/articles`             — article list, filterable by campaign
//! - `GET /api/v1/articles/:public_id`  — full article including body HTML

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, parse_public_id, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ArticlesQuery {
    /// Campaign public id filter.
    campaign: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct ArticleItem {
    pub article_id: Uuid,
    pub store_id: i64,
    pub title: String,
    pub status: String,
    pub language: String,
    pub word_count: i32,
    pub quality_score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct ArticleDetail {
    pub article_id: Uuid,
    pub campaign_id: Option<Uuid>,
    pub store_id: i64,
    pub title: String,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub language: String,
    pub word_count: i32,
    pub status: String,
    pub quality_score: i32,
    pub validation_issues: serde_json::Value,
    pub product_links: serde_json::Value,
    pub body_html: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// GET /api/v1/articles — newest first, optionally narrowed to one campaign.
pub(in crate::api) async fn list_articles(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<ApiResponse<Vec<ArticleItem>>>, ApiError> {
    let rid = &req_id.0;
    let limit = normalize_limit(query.limit);

    let campaign_id = match query.campaign.as_deref() {
        Some(raw) => {
            let public_id = parse_public_id(rid, raw)?;
            let campaign = blogsmith_db::get_campaign_by_public_id(&state.pool, public_id)
                .await
                .map_err(|e| match e {
                    blogsmith_db::DbError::NotFound => ApiError::new(
                        rid.clone(),
                        "not_found",
                        format!("campaign '{raw}' not found"),
                    ),
                    other => map_db_error(rid.clone(), &other),
                })?;
            Some(campaign.id)
        }
        None => None,
    };

    let rows = blogsmith_db::list_articles(&state.pool, campaign_id, limit)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let items = rows
        .into_iter()
        .map(|row| ArticleItem {
            article_id: row.public_id,
            store_id: row.store_id,
            title: row.title,
            status: row.status,
            language: row.language,
            word_count: row.word_count,
            quality_score: row.quality_score,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// GET /api/v1/articles/:public_id — full article detail.
pub(in crate::api) async fn get_article(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(public_id): Path<String>,
) -> Result<Json<ApiResponse<ArticleDetail>>, ApiError> {
    let rid = &req_id.0;
    let parsed = parse_public_id(rid, &public_id)?;

    let row = blogsmith_db::get_article_by_public_id(&state.pool, parsed)
        .await
        .map_err(|e| match e {
            blogsmith_db::DbError::NotFound => ApiError::new(
                rid.clone(),
                "not_found",
                format!("article '{public_id}' not found"),
            ),
            other => map_db_error(rid.clone(), &other),
        })?;

    // Articles store the internal campaign id; surface the public one.
    let campaign_public_id = match row.campaign_id {
        Some(id) => Some(
            blogsmith_db::get_campaign(&state.pool, id)
                .await
                .map_err(|e| map_db_error(rid.clone(), &e))?
                .public_id,
        ),
        None => None,
    };

    let detail = ArticleDetail {
        article_id: row.public_id,
        campaign_id: campaign_public_id,
        store_id: row.store_id,
        title: row.title,
        meta_description: row.meta_description,
        keywords: row.keywords,
        category: row.category,
        subcategory: row.subcategory,
        language: row.language,
        word_count: row.word_count,
        status: row.status,
        quality_score: row.quality_score,
        validation_issues: row.validation_issues,
        product_links: row.product_links,
        body_html: row.body_html,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };

    Ok(Json(ApiResponse {
        data: detail,
        meta: ResponseMeta::new(req_id.0),
    }))
}
