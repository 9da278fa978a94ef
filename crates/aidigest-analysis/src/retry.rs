//! Retry with exponential back-off and jitter for completion calls.
//!
//! [`retry_with_backoff`] wraps one model's attempts: transient errors
//! (network failures, 429, 5xx) are retried up to the model's attempt budget;
//! everything else is returned immediately so the caller can move on to the
//! next fallback model.

use std::future::Future;
use std::time::Duration;

use crate::error::AnalysisError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:**
/// - Network-level failures: timeout, connection reset.
/// - HTTP 429: the provider has asked us to back off.
/// - HTTP 5xx: transient server/infrastructure errors.
///
/// **Not retriable (hard stop for this model):**
/// - Other API statuses (4xx): retrying won't fix a rejected request.
/// - [`AnalysisError::Deserialize`] / [`AnalysisError::EmptyResponse`]:
///   malformed reply; the fallback model gets its chance instead.
/// - [`AnalysisError::Unavailable`]: no credentials; nothing to retry.
pub(crate) fn is_retriable(err: &AnalysisError) -> bool {
    match err {
        AnalysisError::Http(e) => e.is_timeout() || e.is_connect(),
        AnalysisError::Api { status, .. } => *status == 429 || *status >= 500,
        AnalysisError::Deserialize { .. }
        | AnalysisError::EmptyResponse
        | AnalysisError::Unavailable => false,
    }
}

/// Runs `operation` up to `max_attempts` times, sleeping between attempts on
/// transient errors.
///
/// Back-off schedule with `backoff_base_ms = 1_000`: 1 s, 2 s, 4 s, each
/// ±25 % jitter, capped at 60 s. Non-retriable errors are returned
/// immediately without consuming the remaining attempt budget.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, AnalysisError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AnalysisError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let budget = max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if !is_retriable(&err) || attempt >= budget {
                    return Err(err);
                }
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_attempts = budget,
                    delay_ms,
                    error = %err,
                    "transient completion error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
