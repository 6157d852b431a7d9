use crate::models::SessionKey;

use super::keyed::KeyedStore;

/// A single playback position per key. Backs both the resume point and the
/// last-seen time; the two are separate instances.
pub struct PositionStore {
    inner: KeyedStore<f64>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self {
            inner: KeyedStore::new(),
        }
    }

    pub fn get(&self, key: &SessionKey) -> Option<f64> {
        self.inner.get(key)
    }

    pub fn set(&self, key: &SessionKey, position: f64) {
        self.inner.insert(key, position);
    }

    pub fn clear(&self, key: &SessionKey) -> Option<f64> {
        self.inner.remove(key)
    }
}

impl Default for PositionStore {
    fn default() -> Self {
        Self::new()
    }
}
