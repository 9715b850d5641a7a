//! Retry policy and error classification.
//!
//! This module encapsulates the fetch error taxonomy, classification for
//! retry decisions, and the bounded fixed-delay retry loop so that the
//! fetcher and any future callers share a consistent policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, RetryNotice};
