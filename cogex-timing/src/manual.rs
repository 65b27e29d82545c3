use crate::{FrameLog, FrameSummary, Timer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Clock that only moves when told to. Clones share the same clock, so a
/// test can keep a handle and advance time while a session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
    frames: FrameLog,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    type Timestamp = u64;

    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }

    fn elapsed(&self, since: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(since))
    }

    /// Advances the shared clock instead of blocking.
    fn sleep(&self, d: Duration) {
        self.advance(d);
    }

    fn record_frame(&mut self, d: Duration) {
        self.frames.record(d);
    }

    fn frame_summary(&self) -> FrameSummary {
        self.frames.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_clock() {
        let timer = ManualTimer::new();
        let handle = timer.clone();
        let t0 = timer.now();
        handle.advance(Duration::from_millis(250));
        assert_eq!(timer.elapsed(t0), Duration::from_millis(250));
        timer.sleep(Duration::from_millis(500));
        assert_eq!(handle.elapsed(t0), Duration::from_millis(750));
    }
}
