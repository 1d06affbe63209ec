//! HTTP client for a store's public product feed.

use std::time::Duration;

use reqwest::Client;

use blogsmith_core::Product;

use crate::error::CatalogError;
use crate::normalize::normalize_product;
use crate::pagination::next_page_cursor;
use crate::retry::retry_with_backoff;
use crate::types::ProductFeedPage;

/// Maximum number of feed pages to fetch before giving up.
/// Guards against cycling cursors producing an infinite loop.
pub const MAX_PAGES: usize = 200;

/// Client for a store's `products.json` feed.
///
/// Handles rate limiting (429), not-found (404), and other non-2xx
/// responses as typed errors, and follows `Link` header cursors across
/// pages. Transient errors (429, network failures) are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct CatalogClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl CatalogClient {
    /// Creates a client with the configured timeout, `User-Agent`, and
    /// retry policy. `max_retries = 0` disables retries.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches one feed page, with automatic retry on transient errors.
    ///
    /// Returns the parsed page plus the raw `Link` header for the caller to
    /// extract the next cursor from.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::RateLimited`] — HTTP 429 after all retries.
    /// - [`CatalogError::NotFound`] — HTTP 404 (not retried).
    /// - [`CatalogError::UnexpectedStatus`] — any other non-2xx status.
    /// - [`CatalogError::Http`] — network or TLS failure after all retries.
    /// - [`CatalogError::Deserialize`] — body is not a valid feed page.
    pub async fn fetch_products_page(
        &self,
        store_url: &str,
        limit: u32,
        page_info: Option<&str>,
    ) -> Result<(ProductFeedPage, Option<String>), CatalogError> {
        let url = Self::feed_url(store_url, limit, page_info)?;
        let domain = store_domain(store_url);

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let domain = domain.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "application/json")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(CatalogError::RateLimited {
                        domain,
                        retry_after_secs,
                    });
                }
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(CatalogError::NotFound { url });
                }
                if !status.is_success() {
                    return Err(CatalogError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                // Read the Link header before the body consumes the response.
                let link_header = response
                    .headers()
                    .get(reqwest::header::LINK)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_owned);

                let body = response.text().await?;
                let page = serde_json::from_str::<ProductFeedPage>(&body).map_err(|e| {
                    CatalogError::Deserialize {
                        context: format!("product feed page from {url}"),
                        source: e,
                    }
                })?;

                Ok((page, link_header))
            }
        })
        .await
    }

    /// Fetches the store's whole catalog, normalized, by following `Link`
    /// cursors until the last page.
    ///
    /// `inter_request_delay_ms` spaces out page requests (applied after
    /// every page except the first). All-or-nothing: a failure on any page
    /// discards earlier pages and returns the error, so callers never see a
    /// partial catalog snapshot.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_products_page`], plus
    /// [`CatalogError::PaginationLimit`] past [`MAX_PAGES`] pages.
    pub async fn fetch_catalog(
        &self,
        store_url: &str,
        limit: u32,
        inter_request_delay_ms: u64,
    ) -> Result<Vec<Product>, CatalogError> {
        let mut catalog: Vec<Product> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_count = 0usize;

        loop {
            page_count += 1;
            if page_count > MAX_PAGES {
                return Err(CatalogError::PaginationLimit {
                    store_url: store_url.to_owned(),
                    max_pages: MAX_PAGES,
                });
            }
            if page_count > 1 && inter_request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(inter_request_delay_ms)).await;
            }

            let (page, link_header) = self
                .fetch_products_page(store_url, limit, cursor.as_deref())
                .await?;

            catalog.extend(page.products.into_iter().map(normalize_product));

            cursor = next_page_cursor(link_header.as_deref());
            if cursor.is_none() {
                break;
            }
        }

        tracing::debug!(
            store_url,
            products = catalog.len(),
            pages = page_count,
            "fetched catalog snapshot"
        );
        Ok(catalog)
    }

    /// Builds the feed URL for the given store, page size, and optional
    /// cursor.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidStoreUrl`] if `store_url` does not
    /// parse as an absolute URL base.
    fn feed_url(
        store_url: &str,
        limit: u32,
        page_info: Option<&str>,
    ) -> Result<String, CatalogError> {
        let base = format!("{}/products.json", store_url.trim_end_matches('/'));
        let mut url =
            reqwest::Url::parse(&base).map_err(|e| CatalogError::InvalidStoreUrl {
                store_url: store_url.to_owned(),
                reason: e.to_string(),
            })?;

        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        if let Some(cursor) = page_info {
            url.query_pairs_mut().append_pair("page_info", cursor);
        }

        Ok(url.to_string())
    }
}

/// Hostname for rate-limit reporting; falls back to the raw URL when it
/// does not parse.
fn store_domain(store_url: &str) -> String {
    reqwest::Url::parse(store_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| store_url.to_owned())
}
