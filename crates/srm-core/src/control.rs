//! Supersession bookkeeping for list refreshes: one in-flight refresh at a
//! time, newer calls cancel older ones.
//!
//! Starting a refresh aborts the previous ticket's flag and bumps a
//! generation counter. The transport checks the flag during the transfer
//! (cooperative abort) and the fetcher re-checks the generation when the
//! attempt resolves, so a stale resolution that slips past the abort is still
//! discarded and never overwrites caller state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Handle identifying one logical refresh. Clones share the abort flag.
#[derive(Debug, Clone)]
pub struct RefreshTicket {
    generation: u64,
    abort: Arc<AtomicBool>,
}

impl RefreshTicket {
    /// Shared flag the transport polls during a transfer.
    pub fn abort_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }
}

/// Tracks the current in-flight refresh. The mutex is held only to swap
/// tickets, never across a request.
#[derive(Debug, Default)]
pub struct RefreshControl {
    current: Mutex<CurrentRefresh>,
}

#[derive(Debug, Default)]
struct CurrentRefresh {
    generation: u64,
    abort: Option<Arc<AtomicBool>>,
}

impl RefreshControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new refresh: abort the previous one (if any) and return the
    /// ticket for this one.
    pub fn begin(&self) -> RefreshTicket {
        let mut current = self.current.lock().unwrap();
        if let Some(prev) = current.abort.take() {
            prev.store(true, Ordering::Relaxed);
        }
        current.generation += 1;
        let abort = Arc::new(AtomicBool::new(false));
        current.abort = Some(Arc::clone(&abort));
        RefreshTicket {
            generation: current.generation,
            abort,
        }
    }

    /// True while `ticket` still identifies the newest refresh. A resolution
    /// arriving on a stale ticket must be discarded.
    pub fn is_current(&self, ticket: &RefreshTicket) -> bool {
        self.current.lock().unwrap().generation == ticket.generation
    }
}
