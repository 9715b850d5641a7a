//! Retry loop: run an async operation until success or policy says stop.

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// Progress notice emitted between retry attempts so the caller can surface
/// "attempt N failed, retrying" to the user.
#[derive(Debug, Clone)]
pub struct RetryNotice {
    /// 1-based attempt number that just failed.
    pub attempt: u32,
    /// Attempt bound (including the first attempt).
    pub max_attempts: u32,
    /// Delay before the next attempt.
    pub delay: Duration,
    /// Human-readable description of the failure.
    pub error: String,
}

/// Runs `op` until it succeeds or the retry policy says to stop.
///
/// On retryable failure, emits a `RetryNotice` to `progress` (if any), sleeps
/// for the policy delay, then tries again. The final error is returned as-is;
/// the caller decides how an exhausted bound is reported.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    progress: Option<&mpsc::Sender<RetryNotice>>,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 1u32;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(delay) => {
                        if let Some(tx) = progress {
                            let _ = tx.try_send(RetryNotice {
                                attempt,
                                max_attempts: policy.max_attempts,
                                delay,
                                error: e.to_string(),
                            });
                        }
                        tracing::debug!(attempt, error = %e, "attempt failed; retrying in {:?}", delay);
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                }
            }
        }
    }
}
