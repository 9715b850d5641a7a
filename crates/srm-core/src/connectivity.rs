//! Process-wide connectivity flag and the observer seam that feeds it.
//!
//! The fetcher reads this flag before every remote operation and fails fast
//! with `FetchError::Offline` when it is unset. Environment-specific signal
//! sources (desktop network managers, link monitors) live behind the
//! `ConnectivitySource` trait; the core does not know where transitions
//! come from.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared online/offline flag. Cheap to clone; all clones observe the same
/// state. Defaults to online.
#[derive(Debug, Clone)]
pub struct ConnectivityState {
    online: Arc<AtomicBool>,
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self {
            online: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl ConnectivityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// Record a connectivity transition (called by a `ConnectivitySource`).
    pub fn set_online(&self, online: bool) {
        let was = self.online.swap(online, Ordering::Relaxed);
        if was != online {
            tracing::info!(online, "connectivity changed");
        }
    }
}

/// Trait implemented by connectivity signal sources. A source is handed the
/// shared state and pushes transitions into it for as long as it lives.
pub trait ConnectivitySource {
    fn subscribe(&mut self, state: ConnectivityState) -> anyhow::Result<()>;
}

/// Source for environments without a connectivity signal: marks the state
/// online once and never reports a transition.
#[derive(Debug, Default)]
pub struct AlwaysOnline;

impl ConnectivitySource for AlwaysOnline {
    fn subscribe(&mut self, state: ConnectivityState) -> anyhow::Result<()> {
        state.set_online(true);
        Ok(())
    }
}
