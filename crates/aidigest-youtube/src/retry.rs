//! Backoff wrapper for transient YouTube API failures.

use std::future::Future;
use std::time::Duration;

use crate::error::YoutubeError;

fn is_retriable(err: &YoutubeError) -> bool {
    match err {
        YoutubeError::Http(e) => e.is_timeout() || e.is_connect(),
        YoutubeError::QuotaExceeded { .. } => true,
        YoutubeError::UnexpectedStatus { status, .. } => *status >= 500,
        YoutubeError::Deserialize { .. } => false,
    }
}

/// Executes `operation` with exponential backoff on transient errors, up to
/// `max_retries` additional attempts after the first try.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, YoutubeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, YoutubeError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient YouTube error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_quota_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(2, 1, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(YoutubeError::QuotaExceeded { status: 429 })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_bad_request() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(3, 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(YoutubeError::UnexpectedStatus {
                    status: 400,
                    url: "http://x".to_owned(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
