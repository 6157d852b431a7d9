use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::models::SessionKey;

/// In-memory map from session key to a value. Entries live until removed
/// or the process exits.
pub(crate) struct KeyedStore<V> {
    entries: RwLock<HashMap<SessionKey, V>>,
}

impl<V> KeyedStore<V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave a half-written entry
    // behind (every write is a single map operation), so poison is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<SessionKey, V>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<SessionKey, V>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn insert(&self, key: &SessionKey, value: V) {
        self.write().insert(key.clone(), value);
    }

    pub(crate) fn remove(&self, key: &SessionKey) -> Option<V> {
        self.write().remove(key)
    }

    /// Run `f` on the entry for `key`, creating it with `V::default()` first.
    pub(crate) fn upsert<F>(&self, key: &SessionKey, f: F)
    where
        V: Default,
        F: FnOnce(&mut V),
    {
        let mut guard = self.write();
        f(guard.entry(key.clone()).or_default());
    }

    pub(crate) fn with<F, T>(&self, key: &SessionKey, f: F) -> Option<T>
    where
        F: FnOnce(&V) -> T,
    {
        self.read().get(key).map(f)
    }

    /// Keys whose entry satisfies `keep`, captured at call time.
    pub(crate) fn keys_where<F>(&self, keep: F) -> Vec<SessionKey>
    where
        F: Fn(&V) -> bool,
    {
        self.read()
            .iter()
            .filter(|(_, value)| keep(value))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.read().len()
    }
}

impl<V: Clone> KeyedStore<V> {
    pub(crate) fn get(&self, key: &SessionKey) -> Option<V> {
        self.read().get(key).cloned()
    }
}
