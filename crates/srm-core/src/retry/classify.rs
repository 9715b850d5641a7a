//! Classify fetch errors into retry policy error kinds.

use crate::retry::error::FetchError;
use crate::retry::policy::ErrorKind;

/// Classify a fetch error into an ErrorKind.
///
/// Offline never reaches the network and a superseded attempt must not be
/// repeated, so both are Fatal; everything else is transient by contract.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Offline | FetchError::Cancelled => ErrorKind::Fatal,
        FetchError::Timeout { .. } => ErrorKind::Timeout,
        FetchError::Transport(_) => ErrorKind::Connection,
        FetchError::ServerError { .. } => ErrorKind::Server,
    }
}

/// Classify a curl error for retry decisions. Used by the transport to decide
/// which variant a failed transfer maps to.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_aborted_by_callback() {
        return ErrorKind::Fatal;
    }
    ErrorKind::Connection
}
