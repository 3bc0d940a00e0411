//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! The calculator form and the history store each sit behind their own
//! async mutex; handlers keep critical sections short and never hold both
//! locks at once.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::calculator::Calculator;
use crate::history::HistoryStore;
use crate::oracle::LayoutOracle;

/// Shared application state. Clone is required by Axum; every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<Mutex<Calculator>>,
    pub history: Arc<Mutex<HistoryStore>>,
    /// `None` when the layout service is not configured.
    pub oracle: Option<Arc<dyn LayoutOracle>>,
}

impl AppState {
    #[must_use]
    pub fn new(history: HistoryStore, oracle: Option<Arc<dyn LayoutOracle>>) -> Self {
        Self {
            calculator: Arc::new(Mutex::new(Calculator::new())),
            history: Arc::new(Mutex::new(history)),
            oracle,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::history::MemoryStore;
    use crate::oracle::ShelfOracle;

    /// State with in-memory history and no oracle.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(HistoryStore::open(MemoryStore::new()), None)
    }

    /// State with in-memory history and the local shelf packer.
    #[must_use]
    pub fn test_app_state_with_shelf() -> AppState {
        AppState::new(HistoryStore::open(MemoryStore::new()), Some(Arc::new(ShelfOracle::new())))
    }
}
