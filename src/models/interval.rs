use serde::{Deserialize, Serialize};

/// One contiguous stretch of playback, in seconds from the start of the video.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub from: f64,
    pub to: f64,
}

impl Interval {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// Length of the interval. Negative for reversed intervals.
    pub fn span(&self) -> f64 {
        self.to - self.from
    }

    /// Well-formed means both bounds are finite and `to >= from`.
    pub fn is_well_formed(&self) -> bool {
        self.from.is_finite() && self.to.is_finite() && self.to >= self.from
    }
}
