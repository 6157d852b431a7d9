use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// What reconciliation does with an interval whose `to < from` or whose
/// bounds are not finite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InvalidIntervalPolicy {
    /// Pass the interval through untouched. A reversed interval then
    /// counts with a negative span, so totals can shrink or go negative.
    Accept,
    /// Discard it when the pending buffer is drained.
    Drop,
    /// Reorder reversed bounds; non-finite intervals are still discarded.
    Swap,
    /// Refuse it at Track time.
    Reject,
}

impl Default for InvalidIntervalPolicy {
    fn default() -> Self {
        InvalidIntervalPolicy::Drop
    }
}

/// Thresholds for reconciliation and the background sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerConfig {
    /// Spans longer than this are seek jumps, not watching (inclusive keep)
    pub max_valid_span_secs: f64,

    /// Used when the client claims a duration of zero or none at all
    pub fallback_duration_secs: f64,

    /// Watched share, in percent, at which a video counts as completed
    pub completion_threshold_percent: f64,

    pub sweep_interval_secs: u64,

    pub invalid_interval_policy: InvalidIntervalPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_valid_span_secs: 30.0,
            fallback_duration_secs: 60.0,
            completion_threshold_percent: 90.0,
            sweep_interval_secs: 30,
            invalid_interval_policy: InvalidIntervalPolicy::default(),
        }
    }
}

impl TrackerConfig {
    /// Reads the config file if present, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Same as [`TrackerConfig::load`], with overrides looked up through `env`.
    pub fn load_with<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                serde_json::from_str(&contents).unwrap_or_else(|err| {
                    warn!(
                        "Ignoring unparsable config at {}: {err}; using defaults",
                        path.display()
                    );
                    Self::default()
                })
            }
            _ => Self::default(),
        };

        config.apply_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = env("WATCHTIME_SWEEP_INTERVAL_SECS") {
            self.sweep_interval_secs = value
                .trim()
                .parse()
                .with_context(|| format!("invalid WATCHTIME_SWEEP_INTERVAL_SECS '{value}'"))?;
        }
        if let Some(value) = env("WATCHTIME_MAX_VALID_SPAN_SECS") {
            self.max_valid_span_secs = value
                .trim()
                .parse()
                .with_context(|| format!("invalid WATCHTIME_MAX_VALID_SPAN_SECS '{value}'"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.max_valid_span_secs.is_finite() && self.max_valid_span_secs > 0.0) {
            bail!("maxValidSpanSecs must be a positive number");
        }
        if !(self.fallback_duration_secs.is_finite() && self.fallback_duration_secs > 0.0) {
            bail!("fallbackDurationSecs must be a positive number");
        }
        if !(self.completion_threshold_percent.is_finite()
            && self.completion_threshold_percent > 0.0)
        {
            bail!("completionThresholdPercent must be a positive number");
        }
        if self.sweep_interval_secs == 0 {
            bail!("sweepIntervalSecs must be greater than zero");
        }
        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Duration the completion ratio is computed against.
    pub fn effective_duration(&self, claimed: Option<f64>) -> f64 {
        match claimed {
            Some(duration) if duration > 0.0 => duration,
            _ => self.fallback_duration_secs,
        }
    }

    pub fn is_completed(&self, total_watch_time: f64, effective_duration: f64) -> bool {
        (total_watch_time / effective_duration) * 100.0 >= self.completion_threshold_percent
    }
}
