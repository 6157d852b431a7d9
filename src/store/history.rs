use crate::models::{Interval, SessionKey};

use super::keyed::KeyedStore;

/// Canonical merged watch history per key. Written only by reconciliation.
pub struct HistoryStore {
    inner: KeyedStore<Vec<Interval>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            inner: KeyedStore::new(),
        }
    }

    /// Copy of the history; empty for keys never reconciled.
    pub fn get(&self, key: &SessionKey) -> Vec<Interval> {
        self.inner.get(key).unwrap_or_default()
    }

    pub fn replace(&self, key: &SessionKey, merged: Vec<Interval>) {
        self.inner.insert(key, merged);
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
