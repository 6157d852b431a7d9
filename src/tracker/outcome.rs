use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a Sync did for one key.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum SyncOutcome {
    /// Nothing was pending; only the resume point moved.
    #[serde(rename_all = "camelCase")]
    NoPendingData { resume_time: f64 },
    Synced(SyncSummary),
}

impl SyncOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SyncOutcome::NoPendingData { .. } => "No intervals, resume time saved",
            SyncOutcome::Synced(_) => "Synced",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub total_watch_time: f64,
    pub is_completed: bool,
    pub resume_time: f64,
    pub effective_duration: f64,
    pub intervals_merged: usize,
    pub seeks_dropped: usize,
    pub malformed_dropped: usize,
}

/// Result of folding one drained buffer into the watch history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Reconciled {
    pub total_watch_time: f64,
    pub intervals_merged: usize,
    pub seeks_dropped: usize,
    pub malformed_dropped: usize,
}

/// Totals for one background sweep cycle.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub keys_visited: usize,
    pub keys_reconciled: usize,
    pub intervals_merged: usize,
    pub seeks_dropped: usize,
    pub malformed_dropped: usize,
}

impl SweepReport {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            keys_visited: 0,
            keys_reconciled: 0,
            intervals_merged: 0,
            seeks_dropped: 0,
            malformed_dropped: 0,
        }
    }

    pub(crate) fn record(&mut self, reconciled: &Reconciled) {
        self.keys_reconciled += 1;
        self.intervals_merged += reconciled.intervals_merged;
        self.seeks_dropped += reconciled.seeks_dropped;
        self.malformed_dropped += reconciled.malformed_dropped;
    }
}
