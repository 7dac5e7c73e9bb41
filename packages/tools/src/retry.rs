//! Fixed-wait retry for remote calls.

use crate::error::{ToolError, ToolResult};
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub wait: Duration,
}

impl RetryPolicy {
    pub const fn fixed(max_attempts: u32, wait: Duration) -> Self {
        Self { max_attempts, wait }
    }

    pub const fn none() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or
    /// runs out of attempts. The last error is returned.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> ToolResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ToolResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Call failed, retrying in {:?}",
                        self.wait
                    );
                    tokio::time::sleep(self.wait).await;
                    attempt += 1;
                }
                Err(err) => {
                    error!(operation, attempt, error = %err, "Call failed");
                    return Err(err);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    /// Three attempts, one second apart
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(1))
    }
}

/// Retry with the default policy
pub async fn retry<T, F, Fut>(operation: &str, op: F) -> ToolResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ToolResult<T>>,
{
    RetryPolicy::default().run(operation, op).await
}

/// Wrap a future with a deadline, mapping expiry to [`ToolError::Timeout`]
pub async fn with_timeout<T, Fut>(limit: Duration, fut: Fut) -> ToolResult<T>
where
    Fut: Future<Output = ToolResult<T>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ToolError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_retries_transport_errors_then_succeeds() {
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result = RetryPolicy::default()
            .run("fetch", || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ToolError::Transport("reset".into()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: ToolResult<()> = RetryPolicy::default()
            .run("fetch", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ToolError::HttpStatus { status: 503, message: "busy".into() })
            })
            .await;

        assert!(matches!(result, Err(ToolError::HttpStatus { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_error_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: ToolResult<()> = retry("fetch", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ToolError::NotFound("model".into()))
        })
        .await;

        assert!(matches!(result, Err(ToolError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_retryable() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::fixed(2, Duration::from_millis(10));
        let result = policy
            .run("slow", || async {
                let first = calls.fetch_add(1, Ordering::SeqCst) == 0;
                with_timeout(Duration::from_secs(5), async move {
                    if first {
                        tokio::time::sleep(Duration::from_secs(60)).await;
                    }
                    Ok("done")
                })
                .await
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
