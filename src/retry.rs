use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Bounded retry with linear backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Blob store writes: 3 attempts, 2 second base delay.
    pub const BLOB_WRITE: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(2));
    /// Metadata record writes: 3 attempts, 1 second base delay.
    pub const METADATA_WRITE: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(1));
    /// Listing queries: 2 attempts, 1 second base delay.
    pub const LIST: RetryPolicy = RetryPolicy::new(2, Duration::from_secs(1));
    /// Deletes on either store: 3 attempts, 1 second base delay.
    pub const DELETE: RetryPolicy = RetryPolicy::new(3, Duration::from_secs(1));
}

/// Run a fallible operation under a retry policy.
///
/// Waits `base_delay * attempt_number` after each failed attempt except the
/// last. Only transient errors are retried; any other class, and the final
/// attempt's error, propagate unchanged. No state is kept between invocations.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!("{}: attempt {} failed: {}", label, attempt, e);

                if attempt >= policy.max_attempts || !e.is_transient() {
                    return Err(e);
                }

                tokio::time::sleep(policy.base_delay * attempt).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_after_linear_backoff() {
        let attempts = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_secs(2));
        let start = tokio::time::Instant::now();

        let result = with_retry(policy, "flaky-op", || {
            let attempts = attempts.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(AppError::UpstreamUnavailable("still down".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // 2s after attempt 1, 4s after attempt 2
        assert!(start.elapsed() >= Duration::from_secs(6));
        assert!(start.elapsed() < Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_propagates_final_error_unchanged() {
        let attempts = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        let result: Result<()> = with_retry(policy, "dead-op", || {
            let attempts = attempts.clone();
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                Err(AppError::NetworkFailure(format!("attempt {}", n)))
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        match result {
            Err(AppError::NetworkFailure(msg)) => assert_eq!(msg, "attempt 3"),
            other => panic!("expected final network failure, got {:?}", other),
        }
        // No wait after the final attempt: 1s + 2s only.
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        let result: Result<()> = with_retry(policy, "rejected-op", || {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(AppError::InvalidInput("bad request".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(AppError::InvalidInput(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn first_attempt_success_returns_immediately() {
        let policy = RetryPolicy::new(2, Duration::from_secs(1));
        let result = with_retry(policy, "ok-op", || async { Ok("done") }).await;
        assert_eq!(result.unwrap(), "done");
    }
}
