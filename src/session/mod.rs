pub mod commands;
pub mod controller;
pub mod state;

use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::history::HistoryStore;

pub use controller::ScanSession;
pub use state::{Phase, SessionSnapshot, SessionState};

/// State shared between the session handle and its decode loop task.
pub(crate) struct SessionShared {
    pub(crate) state: Mutex<SessionState>,
    pub(crate) history: Arc<HistoryStore>,
    updates: watch::Sender<SessionSnapshot>,
}

impl SessionShared {
    pub(crate) fn new(history: Arc<HistoryStore>) -> Self {
        let state = SessionState::new();
        let initial = SessionSnapshot {
            state: state.clone(),
            history: history.entries(),
        };
        let (updates, _) = watch::channel(initial);
        Self {
            state: Mutex::new(state),
            history,
            updates,
        }
    }

    pub(crate) fn snapshot_of(&self, state: &SessionState) -> SessionSnapshot {
        SessionSnapshot {
            state: state.clone(),
            history: self.history.entries(),
        }
    }

    /// Push the current state to subscribers. Call with the state lock held
    /// so snapshots are published in mutation order.
    pub(crate) fn publish(&self, state: &SessionState) {
        self.updates.send_replace(self.snapshot_of(state));
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    pub(crate) async fn is_current(&self, generation: u64) -> bool {
        self.state.lock().await.is_current(generation)
    }
}
