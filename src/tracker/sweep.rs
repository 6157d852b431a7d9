use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::ProgressTracker;

/// Owns the background task that periodically reconciles sessions whose
/// clients never called Sync.
pub struct SweepController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SweepController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn start(&mut self, tracker: ProgressTracker, period: Duration) -> Result<()> {
        if self.handle.is_some() {
            bail!("sweep already running");
        }
        if period.is_zero() {
            bail!("sweep period must be greater than zero");
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(sweep_loop(tracker, period, cancel_token.clone()));

        info!("Background sweep started (every {}s)", period.as_secs_f64());
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Cancel the loop and wait for it. A sweep already in progress finishes
    /// first.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("sweep task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}

impl Default for SweepController {
    fn default() -> Self {
        Self::new()
    }
}

async fn sweep_loop(tracker: ProgressTracker, period: Duration, cancel_token: CancellationToken) {
    // First sweep one full period after start.
    let mut ticker = time::interval_at(Instant::now() + period, period);
    // Cycles run back to back inside this task, so a slow cycle delays the
    // next one instead of overlapping it.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = tracker.sweep().await;
                debug!(
                    "sweep at {} visited {} key(s), reconciled {}",
                    report.started_at, report.keys_visited, report.keys_reconciled
                );
            }
            _ = cancel_token.cancelled() => {
                info!("sweep loop shutting down");
                break;
            }
        }
    }
}
