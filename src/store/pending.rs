use crate::models::{Interval, SessionKey};

use super::keyed::KeyedStore;

/// Raw intervals reported since the last reconciliation of each key.
pub struct PendingStore {
    inner: KeyedStore<Vec<Interval>>,
}

impl PendingStore {
    pub fn new() -> Self {
        Self {
            inner: KeyedStore::new(),
        }
    }

    pub fn append(&self, key: &SessionKey, interval: Interval) {
        self.inner.upsert(key, |buffer| buffer.push(interval));
    }

    /// Remove and return the whole buffer in one step. Anything appended
    /// afterwards starts a fresh buffer.
    pub fn drain(&self, key: &SessionKey) -> Vec<Interval> {
        self.inner.remove(key).unwrap_or_default()
    }

    pub fn pending_count(&self, key: &SessionKey) -> usize {
        self.inner.with(key, Vec::len).unwrap_or(0)
    }

    /// Snapshot of keys holding at least one pending interval.
    pub fn keys_with_pending(&self) -> Vec<SessionKey> {
        self.inner.keys_where(|buffer| !buffer.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }
}

impl Default for PendingStore {
    fn default() -> Self {
        Self::new()
    }
}
