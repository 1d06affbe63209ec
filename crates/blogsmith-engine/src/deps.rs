//! Collaborator seams and dependency wiring for the generation engine.
//!
//! The engine talks to its catalog, writer, and publish collaborators
//! through traits so the cycle can be driven end to end with in-memory
//! fakes in tests. The `Http*` types wrap the real clients.

use std::future::Future;

use blogsmith_catalog::{CatalogClient, CatalogError};
use blogsmith_core::{AppConfig, Product};
use blogsmith_db::ArticleRow;
use blogsmith_writer::{ArticleRequest, GeneratedArticle, WriterClient, WriterError};
use sqlx::PgPool;
use thiserror::Error;

use crate::EngineError;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Product catalog source for a storefront.
pub trait Catalog: Send + Sync {
    /// Fetch the full catalog snapshot for the store at `store_url`.
    fn fetch_catalog(
        &self,
        store_url: &str,
    ) -> impl Future<Output = Result<Vec<Product>, CatalogError>> + Send;
}

/// Article generation backend.
pub trait ArticleWriter: Send + Sync {
    /// Generate one article for the request's campaign settings and
    /// product brief.
    fn generate_article(
        &self,
        request: &ArticleRequest<'_>,
    ) -> impl Future<Output = Result<GeneratedArticle, WriterError>> + Send;
}

/// Error from a publish collaborator. The engine only logs these; a publish
/// failure never rolls back the stored article.
#[derive(Debug, Error)]
#[error("publish failed: {reason}")]
pub struct PublishError {
    pub reason: String,
}

/// Post-persist hook invoked for `auto_publish` campaigns whose article
/// passed validation.
pub trait PublishHook: Send + Sync {
    fn publish(
        &self,
        article: &ArticleRow,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

// ---------------------------------------------------------------------------
// Engine configuration and dependency bundle
// ---------------------------------------------------------------------------

const DEFAULT_LOCK_TTL_SECS: i64 = 900;
const DEFAULT_MAX_CONCURRENT_CAMPAIGNS: usize = 4;
const DEFAULT_DUE_BATCH_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Age after which a held generation lock counts as abandoned.
    pub lock_ttl_secs: i64,
    /// Campaigns processed in parallel by one sweep.
    pub max_concurrent_campaigns: usize,
    /// Upper bound on campaigns picked up per sweep.
    pub due_batch_limit: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_ttl_secs: DEFAULT_LOCK_TTL_SECS,
            max_concurrent_campaigns: DEFAULT_MAX_CONCURRENT_CAMPAIGNS,
            due_batch_limit: DEFAULT_DUE_BATCH_LIMIT,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            lock_ttl_secs: i64::try_from(config.generation_lock_ttl_secs)
                .unwrap_or(DEFAULT_LOCK_TTL_SECS),
            max_concurrent_campaigns: config.engine_max_concurrent_campaigns.max(1),
            due_batch_limit: DEFAULT_DUE_BATCH_LIMIT,
        }
    }
}

/// Everything one generation cycle needs. Shared by the scheduler sweep,
/// the manual-trigger endpoint, and the CLI.
pub struct EngineDeps<C, W, P> {
    pub pool: PgPool,
    pub catalog: C,
    pub writer: W,
    pub publisher: P,
    pub config: EngineConfig,
}

impl EngineDeps<HttpCatalog, HttpWriter, NoopPublisher> {
    /// Wire up the production collaborators from app config.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingWriterKey`] when no OpenAI key is
    /// configured, or [`EngineError::ClientBuild`] when an HTTP client
    /// cannot be constructed.
    pub fn production(pool: PgPool, config: &AppConfig) -> Result<Self, EngineError> {
        Ok(Self {
            pool,
            catalog: HttpCatalog::from_app_config(config)?,
            writer: HttpWriter::from_app_config(config)?,
            publisher: NoopPublisher,
            config: EngineConfig::from_app_config(config),
        })
    }
}

// ---------------------------------------------------------------------------
// Production collaborators
// ---------------------------------------------------------------------------

/// Storefront product feed over HTTP.
pub struct HttpCatalog {
    client: CatalogClient,
    page_size: u32,
    inter_request_delay_ms: u64,
}

impl HttpCatalog {
    /// # Errors
    ///
    /// Returns [`EngineError::ClientBuild`] if the HTTP client cannot be
    /// constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, EngineError> {
        let client = CatalogClient::new(
            config.catalog_request_timeout_secs,
            &config.catalog_user_agent,
            config.catalog_max_retries,
            config.catalog_retry_backoff_base_secs,
        )
        .map_err(|e| EngineError::ClientBuild {
            component: "catalog",
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            page_size: config.catalog_page_size,
            inter_request_delay_ms: config.catalog_inter_request_delay_ms,
        })
    }
}

impl Catalog for HttpCatalog {
    async fn fetch_catalog(&self, store_url: &str) -> Result<Vec<Product>, CatalogError> {
        self.client
            .fetch_catalog(store_url, self.page_size, self.inter_request_delay_ms)
            .await
    }
}

/// Chat-completion article writer over HTTP.
pub struct HttpWriter {
    client: WriterClient,
}

impl HttpWriter {
    /// # Errors
    ///
    /// Returns [`EngineError::MissingWriterKey`] when no API key is
    /// configured, or [`EngineError::ClientBuild`] if the HTTP client cannot
    /// be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, EngineError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .ok_or(EngineError::MissingWriterKey)?;
        let client = WriterClient::new(
            api_key,
            &config.writer_model,
            config.writer_request_timeout_secs,
            config.writer_max_retries,
            config.writer_retry_backoff_base_secs,
        )
        .map_err(|e| EngineError::ClientBuild {
            component: "writer",
            reason: e.to_string(),
        })?;

        Ok(Self { client })
    }
}

impl ArticleWriter for HttpWriter {
    async fn generate_article(
        &self,
        request: &ArticleRequest<'_>,
    ) -> Result<GeneratedArticle, WriterError> {
        self.client.generate_article(request).await
    }
}

/// Publish hook used until a storefront publishing integration is wired in:
/// accepts every article, so `auto_publish` campaigns go straight to
/// `published`.
pub struct NoopPublisher;

impl PublishHook for NoopPublisher {
    async fn publish(&self, _article: &ArticleRow) -> Result<(), PublishError> {
        Ok(())
    }
}
