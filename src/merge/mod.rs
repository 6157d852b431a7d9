pub mod algorithm;
pub mod filter;

pub use algorithm::{merge_intervals, merge_into, MergeResult};
pub use filter::{filter_batch, FilteredBatch};
