//! Shared application state for the garden API.
//!
//! The [`Garden`] sits behind one async mutex shared with the tick loop.
//! Handlers hold the lock only while touching the garden; slow work such as
//! wisdom extraction happens before the lock is taken.

use std::sync::Arc;

use tokio::sync::Mutex;

use mindforest_core::{Clock, Garden};
use mindforest_db::Mirror;
use mindforest_extractor::Extractor;

/// State shared by every handler.
pub struct AppState {
    /// The garden session.
    pub garden: Arc<Mutex<Garden>>,
    /// Time source for actions.
    pub clock: Arc<dyn Clock>,
    /// Wisdom extraction backend, if configured.
    pub extractor: Option<Arc<Extractor>>,
    /// Background persistence.
    pub mirror: Mirror,
}

impl AppState {
    /// Create state over an existing garden.
    pub fn new(garden: Arc<Mutex<Garden>>, clock: Arc<dyn Clock>, mirror: Mirror) -> Self {
        Self {
            garden,
            clock,
            extractor: None,
            mirror,
        }
    }

    /// Attach an extraction backend.
    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<Extractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Current time in Unix milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Mirror the fruit balance, collection and entitlements.
    pub(crate) fn persist_stats(&self, garden: &Garden) {
        self.mirror
            .stats(garden.balance(), garden.collected(), garden.user());
    }
}
