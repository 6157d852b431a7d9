mod history;
mod keyed;
mod locks;
mod pending;
mod positions;

pub use history::HistoryStore;
pub use locks::KeyLocks;
pub use pending::PendingStore;
pub use positions::PositionStore;

/// The four per-key stores plus the lock table that serialises writers.
#[derive(Default)]
pub struct Stores {
    pub pending: PendingStore,
    pub history: HistoryStore,
    pub resume_points: PositionStore,
    pub last_seen: PositionStore,
    pub locks: KeyLocks,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }
}
