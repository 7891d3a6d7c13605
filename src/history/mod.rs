//! Newest-first, deduplicated, bounded log of scan results.
//!
//! The store never fails towards its caller: a history that cannot be read
//! or written must not block scanning.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::models::ScanResult;
use crate::storage::{KeyValueStore, HISTORY_KEY};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

pub const HISTORY_CAPACITY: usize = 50;

/// Ordered results, newest first, at most [`HISTORY_CAPACITY`] entries with
/// pairwise distinct `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog(Vec<ScanResult>);

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from arbitrary stored entries, restoring the invariants
    /// in case the blob was written by something else.
    pub fn from_entries(entries: Vec<ScanResult>) -> Self {
        let mut log = Self::new();
        for entry in entries.into_iter().rev() {
            log.push_front(entry);
        }
        log
    }

    pub fn push_front(&mut self, result: ScanResult) {
        self.0.retain(|existing| existing.text != result.text);
        self.0.insert(0, result);
        self.0.truncate(HISTORY_CAPACITY);
    }

    pub fn entries(&self) -> &[ScanResult] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<ScanResult> {
        self.0
    }
}

pub struct HistoryStore {
    store: Arc<dyn KeyValueStore>,
    log: Mutex<HistoryLog>,
}

impl HistoryStore {
    /// Create the store and prime the in-memory log from persisted state.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let initial = read_persisted(store.as_ref());
        Self {
            store,
            log: Mutex::new(initial),
        }
    }

    /// Insert `result` at the front, dropping any entry with the same text,
    /// truncate, persist, and return the updated log.
    pub fn append(&self, result: ScanResult) -> Vec<ScanResult> {
        let mut guard = self.lock();
        guard.push_front(result);

        match serde_json::to_string(&*guard) {
            Ok(serialized) => {
                if let Err(err) = self.store.set(HISTORY_KEY, &serialized) {
                    log_warn!("failed to persist scan history: {err:#}");
                }
            }
            Err(err) => log_warn!("failed to serialize scan history: {err}"),
        }

        guard.entries().to_vec()
    }

    /// Re-read persisted history, replacing the in-memory copy.
    pub fn load(&self) -> Vec<ScanResult> {
        let loaded = read_persisted(self.store.as_ref());
        let mut guard = self.lock();
        *guard = loaded;
        guard.entries().to_vec()
    }

    pub fn clear(&self) {
        let mut guard = self.lock();
        *guard = HistoryLog::new();
        if let Err(err) = self.store.remove(HISTORY_KEY) {
            log_warn!("failed to remove persisted scan history: {err:#}");
        }
    }

    pub fn entries(&self) -> Vec<ScanResult> {
        self.lock().entries().to_vec()
    }

    fn lock(&self) -> MutexGuard<'_, HistoryLog> {
        match self.log.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn read_persisted(store: &dyn KeyValueStore) -> HistoryLog {
    let raw = match store.get(HISTORY_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return HistoryLog::new(),
        Err(err) => {
            log_warn!("failed to read scan history, starting empty: {err:#}");
            return HistoryLog::new();
        }
    };

    match serde_json::from_str::<Vec<ScanResult>>(&raw) {
        Ok(entries) => HistoryLog::from_entries(entries),
        Err(err) => {
            log_debug!("discarding unparsable scan history: {err}");
            HistoryLog::new()
        }
    }
}
