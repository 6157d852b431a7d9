use log::warn;

use crate::config::{InvalidIntervalPolicy, TrackerConfig};
use crate::models::Interval;

/// Intervals that survive filtering, with counts of what was discarded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredBatch {
    pub kept: Vec<Interval>,
    pub seeks_dropped: usize,
    pub malformed_dropped: usize,
}

/// Apply the malformed-interval policy, then drop seek jumps.
///
/// A span equal to `max_valid_span_secs` is kept.
pub fn filter_batch(raw: Vec<Interval>, config: &TrackerConfig) -> FilteredBatch {
    let mut batch = FilteredBatch {
        kept: Vec::with_capacity(raw.len()),
        ..FilteredBatch::default()
    };

    for interval in raw {
        let Some(interval) = normalize(interval, config.invalid_interval_policy) else {
            batch.malformed_dropped += 1;
            continue;
        };

        if interval.span() > config.max_valid_span_secs {
            batch.seeks_dropped += 1;
            continue;
        }

        batch.kept.push(interval);
    }

    if batch.malformed_dropped > 0 {
        warn!(
            "Discarded {} malformed interval(s) under {:?} policy",
            batch.malformed_dropped, config.invalid_interval_policy
        );
    }

    batch
}

fn normalize(interval: Interval, policy: InvalidIntervalPolicy) -> Option<Interval> {
    if interval.is_well_formed() {
        return Some(interval);
    }

    match policy {
        InvalidIntervalPolicy::Accept => Some(interval),
        InvalidIntervalPolicy::Swap if interval.from.is_finite() && interval.to.is_finite() => {
            Some(Interval::new(interval.to, interval.from))
        }
        // Reject refuses at Track time; anything that still slipped in is dropped.
        InvalidIntervalPolicy::Swap | InvalidIntervalPolicy::Drop | InvalidIntervalPolicy::Reject => {
            None
        }
    }
}
