//! Retry with exponential back-off and jitter for the writer client.
//!
//! Generation calls are the slowest and flakiest part of a cycle, so 429s,
//! 5xx responses, and network-level failures get a few jittered retries.
//! Application-level failures (4xx, malformed payloads, empty content) are
//! returned immediately; retrying cannot fix them.

use std::future::Future;
use std::time::Duration;

use crate::error::WriterError;

pub(crate) fn is_retriable(err: &WriterError) -> bool {
    match err {
        WriterError::RateLimited { .. } => true,
        WriterError::UnexpectedStatus { status, .. } => *status >= 500,
        WriterError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        WriterError::Deserialize { .. }
        | WriterError::EmptyContent { .. }
        | WriterError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors. Delay before the n-th retry is
/// `backoff_base_secs * 2^(n-1)` seconds, capped at 60s, then jittered by
/// ±25% so parallel campaigns do not hammer the API in lockstep.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, WriterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, WriterError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_secs
                    .saturating_mul(1000)
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient writer error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
