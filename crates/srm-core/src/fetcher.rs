//! Resilient fetch core: remote reads and writes with timeout, offline
//! guard, bounded retry, and supersession of in-flight list refreshes.
//!
//! Each attempt runs one curl transfer in `spawn_blocking`; the attempt
//! resolves on completion, timeout, or abort. A newer list refresh always
//! supersedes an older one: the older transfer is aborted cooperatively and
//! a resolution that still slips through is discarded by generation check.

use crate::config::{SrmConfig, WriteEncoding};
use crate::connectivity::ConnectivityState;
use crate::control::{RefreshControl, RefreshTicket};
use crate::endpoint::{self, Read, Vocabulary, Write};
use crate::record::{self, Ack, Record};
use crate::retry::{run_with_retry, FetchError, RetryNotice, RetryPolicy};
use crate::transport::{self, HttpResponse};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

/// Outcome of a caller-facing list refresh. Exhausted retries yield an empty
/// record list plus the error so the UI renders an empty/error state rather
/// than stale data; a superseded refresh yields nothing at all.
#[derive(Debug)]
pub struct ListRefresh {
    pub records: Vec<Record>,
    pub error: Option<FetchError>,
    /// True when this refresh was superseded by a newer one. The caller must
    /// discard the outcome without rendering.
    pub cancelled: bool,
}

/// Remote read/write client with cancellation, timeout, and bounded retry.
pub struct ResilientFetcher {
    endpoint: Url,
    vocab: Vocabulary,
    timeout: Duration,
    write_encoding: WriteEncoding,
    policy: RetryPolicy,
    connectivity: ConnectivityState,
    refresh: RefreshControl,
}

impl ResilientFetcher {
    /// Fetcher with built-in defaults (20s timeout, 3 attempts, 1s delay).
    pub fn new(endpoint: Url, connectivity: ConnectivityState) -> Self {
        Self::from_config(&SrmConfig::default(), endpoint, connectivity)
    }

    pub fn from_config(cfg: &SrmConfig, endpoint: Url, connectivity: ConnectivityState) -> Self {
        let retry = cfg.retry.clone().unwrap_or_default();
        Self {
            endpoint,
            vocab: Vocabulary::from_preset(cfg.vocabulary),
            timeout: Duration::from_secs(cfg.timeout_secs),
            write_encoding: cfg.write_encoding,
            policy: RetryPolicy {
                max_attempts: retry.max_attempts,
                delay: Duration::from_secs_f64(retry.delay_secs),
            },
            connectivity,
            refresh: RefreshControl::new(),
        }
    }

    /// One-shot list refresh. Cancels any previous in-flight refresh, then
    /// resolves to the records, `Offline` (no attempt made), `Timeout`,
    /// `ServerError`, or `Cancelled` if itself superseded meanwhile.
    pub async fn fetch_list(&self) -> Result<Vec<Record>, FetchError> {
        let ticket = self.refresh.begin();
        self.list_attempt(ticket).await
    }

    /// List refresh with bounded retry. Transient failures (timeout,
    /// connection, server) retry up to the policy bound with a fixed delay,
    /// emitting a `RetryNotice` between attempts; `Offline` and `Cancelled`
    /// are surfaced immediately. An exhausted bound reports as `ServerError`.
    pub async fn fetch_list_with_retry(
        &self,
        progress: Option<&mpsc::Sender<RetryNotice>>,
    ) -> Result<Vec<Record>, FetchError> {
        let ticket = self.refresh.begin();
        run_with_retry(&self.policy, progress, |_| self.list_attempt(ticket.clone()))
            .await
            .map_err(|e| self.exhausted(e))
    }

    /// Caller-facing refresh: never fails, always yields something the UI can
    /// render (records, or empty plus an error message).
    pub async fn refresh(&self, progress: Option<&mpsc::Sender<RetryNotice>>) -> ListRefresh {
        match self.fetch_list_with_retry(progress).await {
            Ok(records) => ListRefresh {
                records,
                error: None,
                cancelled: false,
            },
            Err(FetchError::Cancelled) => ListRefresh {
                records: Vec::new(),
                error: None,
                cancelled: true,
            },
            Err(e) => {
                tracing::warn!(error = %e, "list refresh failed");
                ListRefresh {
                    records: Vec::new(),
                    error: Some(e),
                    cancelled: false,
                }
            }
        }
    }

    /// Column discovery via the header-list action. Not a list refresh, so it
    /// neither supersedes nor is superseded.
    pub async fn fetch_headers(&self) -> Result<Vec<String>, FetchError> {
        self.guard_online()?;
        let url = endpoint::read_url(&self.endpoint, &self.vocab, &Read::Headers);
        let response = self.http_get(url, None).await?;
        check_status(&response)?;
        record::parse_headers(&response.body)
    }

    /// Keyed read. `Ok(None)` when the id matches nothing.
    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<Record>, FetchError> {
        self.guard_online()?;
        let url = endpoint::read_url(&self.endpoint, &self.vocab, &Read::ById(id.to_string()));
        let response = self.http_get(url, None).await?;
        check_status(&response)?;
        record::parse_one(&response.body)
    }

    /// Submit a write (add/update/delete). Same timeout and offline guard as
    /// reads, but never retried automatically: writes are not idempotent-safe,
    /// so failure surfaces directly to the caller.
    pub async fn submit(&self, write: &Write) -> Result<Ack, FetchError> {
        self.guard_online()?;
        let payload = endpoint::write_body(&self.vocab, write, self.write_encoding);
        let url = self.endpoint.to_string();
        let timeout = self.timeout;
        let response = join_fetch(
            tokio::task::spawn_blocking(move || transport::post(&url, &payload, timeout, None))
                .await,
        )?;
        check_status(&response)?;
        record::parse_ack(&response.body)
    }

    /// One list attempt under `ticket`. Shared by the one-shot and retrying
    /// paths so every attempt honors the same guards.
    async fn list_attempt(&self, ticket: RefreshTicket) -> Result<Vec<Record>, FetchError> {
        self.guard_online()?;
        if ticket.is_aborted() {
            return Err(FetchError::Cancelled);
        }
        let url = endpoint::read_url(&self.endpoint, &self.vocab, &Read::List);
        let result = self.http_get(url, Some(ticket.abort_flag())).await;
        // A stale resolution must not surface even if the transfer finished
        // before the abort flag was seen.
        if !self.refresh.is_current(&ticket) {
            return Err(FetchError::Cancelled);
        }
        let response = result?;
        check_status(&response)?;
        record::parse_records(&response.body)
    }

    async fn http_get(
        &self,
        url: Url,
        abort: Option<Arc<AtomicBool>>,
    ) -> Result<HttpResponse, FetchError> {
        let url = url.to_string();
        let timeout = self.timeout;
        join_fetch(tokio::task::spawn_blocking(move || transport::get(&url, timeout, abort)).await)
    }

    fn guard_online(&self) -> Result<(), FetchError> {
        if self.connectivity.is_online() {
            Ok(())
        } else {
            Err(FetchError::Offline)
        }
    }

    /// Map the final error of an exhausted retry loop. Timeouts and
    /// connection failures were retried transparently; once the bound is
    /// spent they report as a server error like any other refresh failure.
    fn exhausted(&self, e: FetchError) -> FetchError {
        match e {
            FetchError::Timeout { .. } | FetchError::Transport(_) => FetchError::ServerError {
                status: None,
                message: format!("gave up after {} attempts: {e}", self.policy.max_attempts),
            },
            other => other,
        }
    }
}

fn check_status(response: &HttpResponse) -> Result<(), FetchError> {
    if response.is_success() {
        return Ok(());
    }
    let snippet = String::from_utf8_lossy(&response.body);
    let snippet = snippet.trim();
    let message = if snippet.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        format!("HTTP {}: {:.120}", response.status, snippet)
    };
    Err(FetchError::ServerError {
        status: Some(response.status),
        message,
    })
}

fn join_fetch(
    joined: Result<Result<HttpResponse, FetchError>, tokio::task::JoinError>,
) -> Result<HttpResponse, FetchError> {
    match joined {
        Ok(result) => result,
        Err(e) => Err(FetchError::server(format!("fetch worker failed: {e}"))),
    }
}
