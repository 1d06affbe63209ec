use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("text generation rate limited (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from text generation: {detail}")]
    UnexpectedStatus { status: u16, detail: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The completion came back 2xx but with no usable article in it:
    /// empty choices, null content, or blank title/body fields.
    #[error("text generation returned no usable content: {reason}")]
    EmptyContent { reason: String },

    #[error("invalid writer base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
