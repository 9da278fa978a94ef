//! Backoff retry for transient GitHub API failures.

use std::future::Future;
use std::time::Duration;

use crate::error::GithubError;

/// Retriable: network-level failures, 429/rate limits, and 5xx statuses.
/// Deserialize errors and other 4xx statuses are propagated immediately.
fn is_retriable(err: &GithubError) -> bool {
    match err {
        GithubError::Http(e) => e.is_timeout() || e.is_connect(),
        GithubError::RateLimited { .. } => true,
        GithubError::UnexpectedStatus { status, .. } => *status >= 500,
        GithubError::Deserialize { .. } => false,
    }
}

/// Executes `operation` with exponential backoff on transient errors, up to
/// `max_retries` additional attempts after the first try.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, GithubError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GithubError>>,
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
                    "transient GitHub error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn retries_server_error_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(GithubError::UnexpectedStatus {
                        status: 502,
                        url: "https://api.github.com/search/repositories".to_owned(),
                    })
                } else {
                    Ok::<u32, GithubError>(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(GithubError::UnexpectedStatus {
                    status: 404,
                    url: "https://api.github.com/repos/acme/gone/readme".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.is_err());
    }
}
