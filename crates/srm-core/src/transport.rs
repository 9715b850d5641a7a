//! HTTP transport: one curl Easy transfer per attempt.
//!
//! Uses the curl crate (libcurl) with a hard wall-clock timeout and an abort
//! flag polled from the progress callback, so a superseded refresh cancels
//! the transfer instead of running to completion. Runs in the current thread;
//! call from `spawn_blocking` when used from async code.

use crate::endpoint::WriteBody;
use crate::retry::{classify_curl_error, ErrorKind, FetchError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Raw response: status code plus body bytes. Interpretation (envelope,
/// records, acks) happens in `record::parse`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Perform a GET. `abort` is the supersession flag of the owning refresh;
/// pass `None` for operations that are never superseded.
pub fn get(
    url: &str,
    timeout: Duration,
    abort: Option<Arc<AtomicBool>>,
) -> Result<HttpResponse, FetchError> {
    perform(url, timeout, abort, None)
}

/// Perform a POST carrying an encoded write body.
pub fn post(
    url: &str,
    payload: &WriteBody,
    timeout: Duration,
    abort: Option<Arc<AtomicBool>>,
) -> Result<HttpResponse, FetchError> {
    perform(url, timeout, abort, Some(payload))
}

fn perform(
    url: &str,
    timeout: Duration,
    abort: Option<Arc<AtomicBool>>,
    payload: Option<&WriteBody>,
) -> Result<HttpResponse, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(15).min(timeout))?;
    easy.timeout(timeout)?;

    if let Some(payload) = payload {
        easy.post(true)?;
        easy.post_fields_copy(&payload.body)?;
        let mut list = curl::easy::List::new();
        list.append(&format!("Content-Type: {}", payload.content_type))?;
        easy.http_headers(list)?;
    }

    // The progress callback is the cancellation point: returning false makes
    // libcurl abort the transfer with an aborted-by-callback error.
    easy.progress(true)?;

    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        if let Some(flag) = abort {
            transfer.progress_function(move |_, _, _, _| !flag.load(Ordering::Relaxed))?;
        }
        if let Err(e) = transfer.perform() {
            return Err(map_curl_error(e, timeout));
        }
    }

    let status = easy.response_code()?;
    Ok(HttpResponse { status, body })
}

fn map_curl_error(e: curl::Error, timeout: Duration) -> FetchError {
    match classify_curl_error(&e) {
        ErrorKind::Timeout => FetchError::Timeout { limit: timeout },
        // An aborted callback means the supersession flag was seen.
        ErrorKind::Fatal => FetchError::Cancelled,
        _ => FetchError::Transport(e),
    }
}
