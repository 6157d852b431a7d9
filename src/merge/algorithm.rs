use crate::models::Interval;

/// Canonical form of a set of intervals: sorted by `from`, pairwise
/// non-overlapping, plus the measure of their union.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    pub intervals: Vec<Interval>,
    pub total_watch_time: f64,
}

impl MergeResult {
    pub fn empty() -> Self {
        Self {
            intervals: Vec::new(),
            total_watch_time: 0.0,
        }
    }
}

/// Merge overlapping or touching intervals and sum the covered duration.
///
/// Input order does not matter; empty input yields an empty result with a
/// total of zero.
pub fn merge_intervals(intervals: &[Interval]) -> MergeResult {
    if intervals.is_empty() {
        return MergeResult::empty();
    }

    let mut sorted = intervals.to_vec();
    // Stable, and total_cmp gives NaN a fixed place instead of panicking.
    sorted.sort_by(|a, b| a.from.total_cmp(&b.from));

    let mut merged = Vec::with_capacity(sorted.len());
    let mut current = sorted[0];

    for next in &sorted[1..] {
        if next.from <= current.to {
            current.to = current.to.max(next.to);
        } else {
            merged.push(current);
            current = *next;
        }
    }
    merged.push(current);

    let total_watch_time = merged.iter().map(Interval::span).sum();

    MergeResult {
        intervals: merged,
        total_watch_time,
    }
}

/// Merge a new batch into an already-canonical history.
pub fn merge_into(history: &[Interval], batch: &[Interval]) -> MergeResult {
    let mut combined = Vec::with_capacity(history.len() + batch.len());
    combined.extend_from_slice(history);
    combined.extend_from_slice(batch);
    merge_intervals(&combined)
}
