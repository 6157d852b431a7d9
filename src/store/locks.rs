use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::models::SessionKey;

/// One async mutex per session key, created on first use.
///
/// Entries are never removed: a key's watch history and resume point also
/// live for the whole process, so the table grows no faster than they do.
pub struct KeyLocks {
    locks: Mutex<HashMap<SessionKey, Arc<AsyncMutex<()>>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Wait for exclusive access to `key`. Other keys are unaffected.
    pub async fn lock(&self, key: &SessionKey) -> OwnedMutexGuard<()> {
        let lock = {
            let mut guard = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            guard
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self::new()
    }
}
