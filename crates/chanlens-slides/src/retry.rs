//! Back-off for Drive and Slides calls.

use std::future::Future;
use std::time::Duration;

use crate::error::SlidesError;

/// Only rate limiting, internal errors, unavailability and transport failures are retried.
pub(crate) fn is_retriable(err: &SlidesError) -> bool {
    match err {
        SlidesError::Http(e) => e.is_timeout() || e.is_connect(),
        SlidesError::Api { status, .. } => matches!(status, 429 | 500 | 503),
        SlidesError::MissingTemplate
        | SlidesError::MissingCredentials(_)
        | SlidesError::Auth(_)
        | SlidesError::Deserialize { .. } => false,
    }
}

/// Runs `operation`, retrying up to `max_retries` times with delays of
/// `backoff_base_ms × 2ⁿ` (±25 % jitter, capped at 60 s).
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SlidesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SlidesError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) && attempt < max_retries => {
                let computed = backoff_base_ms.saturating_mul(1u64 << attempt.min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "Google API transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            Err(err) => return Err(err),
        }
    }
}
