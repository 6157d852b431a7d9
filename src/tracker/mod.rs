pub mod controller;
pub mod outcome;
pub mod sweep;

pub use controller::ProgressTracker;
pub use outcome::{SweepReport, SyncOutcome, SyncSummary};
pub use sweep::SweepController;
