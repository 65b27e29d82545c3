mod frames;
mod high_precision;
mod manual;

pub use frames::{FrameLog, FrameSummary};
pub use high_precision::HighPrecisionTimer;
pub use manual::ManualTimer;

use std::time::Duration;

/// Clock used for stimulus onsets, response latencies and the inter-trial delay
pub trait Timer: Clone + Send + Sync {
    type Timestamp: Copy + Clone + Send + Sync + std::fmt::Debug;

    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, since: Self::Timestamp) -> Duration;
    /// Blocks the calling thread.
    fn sleep(&self, d: Duration);
    fn record_frame(&mut self, d: Duration);
    fn frame_summary(&self) -> FrameSummary;
}
