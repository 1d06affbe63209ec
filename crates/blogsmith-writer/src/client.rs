//! HTTP client for the chat-completion text generation API.
//!
//! Wraps `reqwest` with typed error handling and retry. The request asks
//! for `response_format: json_object`, so the completion content is itself
//! a JSON document holding the article; [`WriterClient::generate_article`]
//! parses both layers and never silently substitutes empty content.

use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::json;

use crate::error::WriterError;
use crate::prompt::{build_system_prompt, build_user_prompt, ArticleRequest};
use crate::retry::retry_with_backoff;
use crate::types::{CompletionResponse, GeneratedArticle};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/";

const COMPLETION_TEMPERATURE: f64 = 0.7;

/// Client for the text-generation API.
///
/// Use [`WriterClient::new`] for production or
/// [`WriterClient::with_base_url`] to point at a mock server in tests.
pub struct WriterClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: Url,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl WriterClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`WriterError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, WriterError> {
        Self::with_base_url(
            api_key,
            model,
            timeout_secs,
            max_retries,
            backoff_base_secs,
            DEFAULT_BASE_URL,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`WriterError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`WriterError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
        base_url: &str,
    ) -> Result<Self, WriterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // One trailing slash so Url::join appends rather than replaces the
        // last path segment.
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| WriterError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Generates one article for a campaign.
    ///
    /// # Errors
    ///
    /// - [`WriterError::RateLimited`] — HTTP 429 after all retries.
    /// - [`WriterError::UnexpectedStatus`] — non-2xx (5xx retried, 4xx not).
    /// - [`WriterError::Http`] — network or timeout after all retries.
    /// - [`WriterError::Deserialize`] — envelope or article JSON malformed.
    /// - [`WriterError::EmptyContent`] — 2xx with no usable article in it.
    pub async fn generate_article(
        &self,
        request: &ArticleRequest<'_>,
    ) -> Result<GeneratedArticle, WriterError> {
        let url = self
            .base_url
            .join("v1/chat/completions")
            .map_err(|e| WriterError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;

        let body = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": build_system_prompt(request.settings) },
                { "role": "user", "content": build_user_prompt(request) }
            ],
            "temperature": COMPLETION_TEMPERATURE,
        });

        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let body = body.clone();
            async move {
                let response = self
                    .client
                    .post(url)
                    .bearer_auth(&self.api_key)
                    .json(&body)
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(30);
                    return Err(WriterError::RateLimited { retry_after_secs });
                }
                if !status.is_success() {
                    let detail = response.text().await.unwrap_or_default();
                    return Err(WriterError::UnexpectedStatus {
                        status: status.as_u16(),
                        detail: excerpt(&detail),
                    });
                }

                let text = response.text().await?;
                parse_completion(&text)
            }
        })
        .await
    }
}

/// Unwraps both JSON layers: the completion envelope, then the article
/// document inside `choices[0].message.content`.
fn parse_completion(body: &str) -> Result<GeneratedArticle, WriterError> {
    let envelope: CompletionResponse =
        serde_json::from_str(body).map_err(|e| WriterError::Deserialize {
            context: "chat completion envelope".to_owned(),
            source: e,
        })?;

    let content = envelope
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| WriterError::EmptyContent {
            reason: "no choices in response".to_owned(),
        })?
        .message
        .content
        .ok_or_else(|| WriterError::EmptyContent {
            reason: "null message content".to_owned(),
        })?;

    let content = content.trim();
    if content.is_empty() {
        return Err(WriterError::EmptyContent {
            reason: "blank message content".to_owned(),
        });
    }

    let article: GeneratedArticle =
        serde_json::from_str(content).map_err(|e| WriterError::Deserialize {
            context: "generated article JSON".to_owned(),
            source: e,
        })?;

    if article.title.trim().is_empty() {
        return Err(WriterError::EmptyContent {
            reason: "blank article title".to_owned(),
        });
    }
    if article.html_body.trim().is_empty() {
        return Err(WriterError::EmptyContent {
            reason: "blank article body".to_owned(),
        });
    }

    Ok(article)
}

/// Error bodies can be huge HTML pages; keep logs and error values short.
fn excerpt(text: &str) -> String {
    text.chars().take(200).collect()
}
