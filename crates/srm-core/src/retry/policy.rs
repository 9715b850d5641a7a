use std::time::Duration;

/// High-level classification of an error for retry purposes.
///
/// This intentionally stays generic; callers map curl errors, HTTP statuses,
/// or envelope failures into these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Attempt exceeded the wall-clock timeout.
    Timeout,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// Server-side failure: non-2xx status, failure envelope, malformed body.
    Server,
    /// Not retryable: offline (no attempt made) or superseded.
    Fatal,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Bounded retry with a fixed inter-attempt delay.
///
/// List refreshes tolerate a few transient failures before the caller is shown
/// an error state; the delay stays fixed rather than exponential because the
/// bound is small and the endpoint is a single cloud function, not a fleet.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Decide whether to retry a failed attempt.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns
    /// `RetryDecision::NoRetry` when the bound is reached or the error kind is
    /// not retryable.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Fatal => RetryDecision::NoRetry,
            ErrorKind::Timeout | ErrorKind::Connection | ErrorKind::Server => {
                RetryDecision::RetryAfter(self.delay)
            }
        }
    }
}
