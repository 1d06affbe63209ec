mod articles;
mod campaigns;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use blogsmith_core::AppConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Shared so the manual-run handler can wire up generation collaborators
    /// per request.
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &blogsmith_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Parse a path or query segment as a public UUID, keeping the error in the
/// standard envelope instead of axum's bare rejection.
pub(super) fn parse_public_id(request_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    raw.parse::<Uuid>().map_err(|_| {
        ApiError::new(
            request_id,
            "validation_error",
            format!("'{raw}' is not a valid id"),
        )
    })
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/campaigns",
            get(campaigns::list_campaigns).post(campaigns::create_campaign),
        )
        .route(
            "/api/v1/campaigns/{public_id}",
            get(campaigns::get_campaign).patch(campaigns::update_campaign),
        )
        .route(
            "/api/v1/campaigns/{public_id}/transition",
            post(campaigns::transition_campaign),
        )
        .route(
            "/api/v1/campaigns/{public_id}/run",
            post(campaigns::trigger_campaign_run),
        )
        .route(
            "/api/v1/campaigns/{public_id}/executions",
            get(campaigns::list_campaign_executions),
        )
        .route("/api/v1/articles", get(articles::list_articles))
        .route("/api/v1/articles/{public_id}", get(articles::get_article))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match blogsmith_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use blogsmith_core::{CampaignSettings, CampaignStatus, Environment, Frequency};
    use blogsmith_db::{create_campaign, NewCampaign};
    use chrono::{NaiveDate, NaiveTime};
    use tower::ServiceExt;

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_conflict_maps_to_409() {
        let response = ApiError::new("req-1", "conflict", "already running").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_unavailable_maps_to_503() {
        let response = ApiError::new("req-1", "unavailable", "writer not configured").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn parse_public_id_rejects_garbage() {
        let err = parse_public_id("req-1", "not-a-uuid").expect_err("should reject");
        assert_eq!(err.error.code, "validation_error");
    }

    // -------------------------------------------------------------------------
    // Route tests (with DB)
    // -------------------------------------------------------------------------

    fn test_config() -> AppConfig {
        AppConfig {
            database_url: "postgres://unused".to_string(),
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().expect("bind addr"),
            log_level: "info".to_string(),
            stores_path: "config/stores.yaml".into(),
            openai_api_key: Some("test-key".to_string()),
            writer_model: "gpt-4o".to_string(),
            writer_request_timeout_secs: 5,
            writer_max_retries: 0,
            writer_retry_backoff_base_secs: 1,
            db_max_connections: 5,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
            catalog_request_timeout_secs: 5,
            catalog_user_agent: "blogsmith-test".to_string(),
            catalog_page_size: 50,
            catalog_inter_request_delay_ms: 0,
            catalog_max_retries: 0,
            catalog_retry_backoff_base_secs: 1,
            engine_max_concurrent_campaigns: 2,
            generation_lock_ttl_secs: 600,
        }
    }

    fn test_app(pool: sqlx::PgPool) -> Router {
        let auth = crate::middleware::AuthState::from_env(true).expect("auth");
        let state = AppState {
            pool,
            config: Arc::new(test_config()),
        };
        build_app(state, auth, default_rate_limit_state())
    }

    async fn seed_store(pool: &sqlx::PgPool, slug: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO stores (public_id, name, slug, base_url) \
             VALUES (gen_random_uuid(), $1, $2, $3) RETURNING id",
        )
        .bind(format!("Store {slug}"))
        .bind(slug)
        .bind(format!("https://{slug}.example.com"))
        .fetch_one(pool)
        .await
        .expect("seed_store failed")
    }

    fn daily_settings(name: &str) -> CampaignSettings {
        CampaignSettings {
            name: name.to_string(),
            description: None,
            frequency: Frequency::Daily,
            schedule_time: NaiveTime::from_hms_opt(6, 0, 0).expect("time"),
            schedule_day: None,
            start_date: NaiveDate::from_ymd_opt(2025, 2, 1).expect("date"),
            end_date: None,
            max_runs: None,
            topic: "sustainable gardening".to_string(),
            keywords: vec!["raised beds".to_string(), "compost".to_string()],
            word_count_min: 500,
            word_count_max: 900,
            writing_style: "informative".to_string(),
            tone: "friendly".to_string(),
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

    async fn seed_campaign(
        pool: &sqlx::PgPool,
        store_id: i64,
        name: &str,
        status: CampaignStatus,
    ) -> blogsmith_db::CampaignRow {
        let settings = daily_settings(name);
        let next_execution = match status {
            CampaignStatus::Active => Some(Utc::now() - chrono::Duration::minutes(5)),
            _ => None,
        };
        create_campaign(
            pool,
            &NewCampaign {
                store_id,
                settings: &settings,
                status,
                next_execution,
            },
        )
        .await
        .expect("seed_campaign failed")
    }

    fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_returns_ok(pool: sqlx::PgPool) {
        let app = test_app(pool);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["data"]["status"].as_str(), Some("ok"));
        assert_eq!(json["data"]["database"].as_str(), Some("ok"));
        assert!(json["meta"]["request_id"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_campaign_returns_created_draft(pool: sqlx::PgPool) {
        seed_store(&pool, "garden-works").await;
        let app = test_app(pool);

        let mut body = serde_json::to_value(daily_settings("Spring Guide")).expect("settings json");
        body["store"] = serde_json::json!("garden-works");

        let response = app
            .oneshot(json_request("POST", "/api/v1/campaigns", &body))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = response_json(response).await;
        assert_eq!(json["data"]["name"].as_str(), Some("Spring Guide"));
        assert_eq!(json["data"]["status"].as_str(), Some("draft"));
        assert!(json["data"]["campaign_id"].is_string());
        assert!(json["data"]["next_execution"].is_null());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_campaign_rejects_empty_keywords(pool: sqlx::PgPool) {
        seed_store(&pool, "garden-works").await;
        let app = test_app(pool);

        let mut settings = daily_settings("No Keywords");
        settings.keywords.clear();
        let mut body = serde_json::to_value(settings).expect("settings json");
        body["store"] = serde_json::json!("garden-works");

        let response = app
            .oneshot(json_request("POST", "/api/v1/campaigns", &body))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_campaign_rejects_unknown_store(pool: sqlx::PgPool) {
        let app = test_app(pool);

        let mut body = serde_json::to_value(daily_settings("Orphan")).expect("settings json");
        body["store"] = serde_json::json!("no-such-store");

        let response = app
            .oneshot(json_request("POST", "/api/v1/campaigns", &body))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"].as_str(), Some("validation_error"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn get_campaign_returns_404_for_unknown_id(pool: sqlx::PgPool) {
        let app = test_app(pool);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/campaigns/00000000-0000-0000-0000-000000000000")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_campaigns_filters_by_store_slug(pool: sqlx::PgPool) {
        let store_a = seed_store(&pool, "store-a").await;
        let store_b = seed_store(&pool, "store-b").await;
        seed_campaign(&pool, store_a, "A One", CampaignStatus::Draft).await;
        seed_campaign(&pool, store_b, "B One", CampaignStatus::Draft).await;
        let app = test_app(pool);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/campaigns?store=store-a")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["name"].as_str(), Some("A One"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn transition_activates_a_draft_campaign(pool: sqlx::PgPool) {
        let store_id = seed_store(&pool, "garden-works").await;
        let campaign = seed_campaign(&pool, store_id, "To Activate", CampaignStatus::Draft).await;
        let app = test_app(pool);

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/campaigns/{}/transition", campaign.public_id),
                &serde_json::json!({"event": "activate"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["data"]["status"].as_str(), Some("active"));
        assert!(
            json["data"]["next_execution"].is_string(),
            "activation should compute the first run slot"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn transition_rejects_invalid_event_with_conflict(pool: sqlx::PgPool) {
        let store_id = seed_store(&pool, "garden-works").await;
        let campaign = seed_campaign(&pool, store_id, "Still Draft", CampaignStatus::Draft).await;
        let app = test_app(pool);

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/campaigns/{}/transition", campaign.public_id),
                &serde_json::json!({"event": "pause"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"].as_str(), Some("conflict"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn manual_run_conflicts_while_generation_in_flight(pool: sqlx::PgPool) {
        let store_id = seed_store(&pool, "garden-works").await;
        let campaign = seed_campaign(&pool, store_id, "Locked", CampaignStatus::Active).await;
        blogsmith_db::claim_generation_lock(&pool, campaign.id, Utc::now(), 600)
            .await
            .expect("claim lock");
        let app = test_app(pool);

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/campaigns/{}/run", campaign.public_id),
                &serde_json::json!({}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"].as_str(), Some("conflict"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn manual_run_rejects_non_active_campaign(pool: sqlx::PgPool) {
        let store_id = seed_store(&pool, "garden-works").await;
        let campaign = seed_campaign(&pool, store_id, "Draft Only", CampaignStatus::Draft).await;
        let app = test_app(pool);

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/campaigns/{}/run", campaign.public_id),
                &serde_json::json!({}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = response_json(response).await;
        assert_eq!(json["error"]["code"].as_str(), Some("conflict"));
        assert!(
            json["error"]["message"]
                .as_str()
                .expect("message")
                .contains("draft"),
            "conflict message should name the blocking status"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn executions_list_is_empty_for_fresh_campaign(pool: sqlx::PgPool) {
        let store_id = seed_store(&pool, "garden-works").await;
        let campaign = seed_campaign(&pool, store_id, "Fresh", CampaignStatus::Draft).await;
        let app = test_app(pool);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!(
                        "/api/v1/campaigns/{}/executions",
                        campaign.public_id
                    ))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn articles_list_returns_empty_without_rows(pool: sqlx::PgPool) {
        let app = test_app(pool);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/articles")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = response_json(response).await;
        assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn article_detail_returns_404_for_unknown_id(pool: sqlx::PgPool) {
        let app = test_app(pool);
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/articles/00000000-0000-0000-0000-000000000000")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
