use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use log::{debug, info};
use tokio::sync::Mutex;

use crate::{
    config::{InvalidIntervalPolicy, TrackerConfig},
    merge::{filter_batch, merge_intervals, merge_into},
    models::{Interval, SessionKey},
    store::Stores,
};

use super::outcome::{Reconciled, SweepReport, SyncOutcome, SyncSummary};

/// Records playback intervals and reconciles them into per-key watch history.
///
/// Every read-modify-write of a key's state runs under that key's lock, so
/// Track, Sync and the sweep serialise per key and never block other keys.
/// Queries read the stores directly without taking the key lock.
#[derive(Clone)]
pub struct ProgressTracker {
    stores: Arc<Stores>,
    config: Arc<TrackerConfig>,
    sweep_gate: Arc<Mutex<()>>,
}

impl ProgressTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            stores: Arc::new(Stores::new()),
            config: Arc::new(config),
            sweep_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Buffer one interval and remember the reporter's playback position.
    pub async fn track(
        &self,
        key: &SessionKey,
        interval: Interval,
        current_time: f64,
    ) -> Result<()> {
        if self.config.invalid_interval_policy == InvalidIntervalPolicy::Reject
            && !interval.is_well_formed()
        {
            bail!(
                "malformed interval {}s - {}s rejected for {key}",
                interval.from,
                interval.to
            );
        }

        let _guard = self.stores.locks.lock(key).await;
        self.stores.pending.append(key, interval);
        self.stores.last_seen.set(key, current_time);

        debug!(
            "[pending] Interval stored for {key}: {}s - {}s",
            interval.from, interval.to
        );
        Ok(())
    }

    /// Drain the key's pending buffer into its watch history and save the
    /// resume point.
    pub async fn sync(
        &self,
        key: &SessionKey,
        current_time: f64,
        claimed_duration: Option<f64>,
    ) -> SyncOutcome {
        let _guard = self.stores.locks.lock(key).await;

        self.stores.last_seen.set(key, current_time);
        let raw = self.stores.pending.drain(key);

        if raw.is_empty() {
            self.stores.resume_points.set(key, current_time);
            info!("[sync] No pending intervals for {key}; resume time saved: {current_time}s");
            return SyncOutcome::NoPendingData {
                resume_time: current_time,
            };
        }

        let reconciled = self.reconcile_locked(key, raw);
        let effective_duration = self.config.effective_duration(claimed_duration);
        let is_completed = self
            .config
            .is_completed(reconciled.total_watch_time, effective_duration);

        self.stores.resume_points.set(key, current_time);

        info!(
            "[sync] {key}: {} interval(s) merged ({} seek, {} malformed dropped); total {}s of {}s; resume {}s; completed {}",
            reconciled.intervals_merged,
            reconciled.seeks_dropped,
            reconciled.malformed_dropped,
            reconciled.total_watch_time,
            effective_duration,
            current_time,
            is_completed
        );

        SyncOutcome::Synced(SyncSummary {
            total_watch_time: reconciled.total_watch_time,
            is_completed,
            resume_time: current_time,
            effective_duration,
            intervals_merged: reconciled.intervals_merged,
            seeks_dropped: reconciled.seeks_dropped,
            malformed_dropped: reconciled.malformed_dropped,
        })
    }

    /// Reconcile every key that still holds pending intervals, using each
    /// key's last seen position as its resume point.
    ///
    /// Only one sweep runs at a time; a second caller waits for the first.
    pub async fn sweep(&self) -> SweepReport {
        let _gate = self.sweep_gate.lock().await;

        let mut report = SweepReport::new(Utc::now());
        let keys = self.stores.pending.keys_with_pending();
        if keys.is_empty() {
            return report;
        }

        info!("[sweep] Waking up to flush {} pending session(s)", keys.len());

        for key in keys {
            report.keys_visited += 1;

            let _guard = self.stores.locks.lock(&key).await;
            let raw = self.stores.pending.drain(&key);
            // A Sync may have drained the key since the snapshot was taken.
            if raw.is_empty() {
                continue;
            }

            let reconciled = self.reconcile_locked(&key, raw);
            let resume_time = self.stores.last_seen.clear(&key).unwrap_or(0.0);
            self.stores.resume_points.set(&key, resume_time);

            info!(
                "[sweep] Saved {key} (total merged watch time: {}s, resume: {}s)",
                reconciled.total_watch_time, resume_time
            );
            report.record(&reconciled);
        }

        info!(
            "[sweep] Done: {} of {} session(s) reconciled",
            report.keys_reconciled, report.keys_visited
        );
        report
    }

    /// Last resume point, or `0.0` for keys never synced or swept.
    pub fn resume_point(&self, key: &SessionKey) -> f64 {
        self.stores.resume_points.get(key).unwrap_or(0.0)
    }

    pub fn total_watch_time(&self, key: &SessionKey) -> f64 {
        merge_intervals(&self.stores.history.get(key)).total_watch_time
    }

    pub fn watch_history(&self, key: &SessionKey) -> Vec<Interval> {
        self.stores.history.get(key)
    }

    pub fn pending_count(&self, key: &SessionKey) -> usize {
        self.stores.pending.pending_count(key)
    }

    pub fn last_seen(&self, key: &SessionKey) -> Option<f64> {
        self.stores.last_seen.get(key)
    }

    /// Caller must hold the key lock.
    fn reconcile_locked(&self, key: &SessionKey, raw: Vec<Interval>) -> Reconciled {
        let batch = filter_batch(raw, &self.config);
        let history = self.stores.history.get(key);
        let merged = merge_into(&history, &batch.kept);
        self.stores.history.replace(key, merged.intervals);

        Reconciled {
            total_watch_time: merged.total_watch_time,
            intervals_merged: batch.kept.len(),
            seeks_dropped: batch.seeks_dropped,
            malformed_dropped: batch.malformed_dropped,
        }
    }
}
