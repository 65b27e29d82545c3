use std::collections::VecDeque;
use std::time::Duration;

const DEFAULT_MAX_SAMPLES: usize = 1000;

/// Display timing derived from recorded frame durations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSummary {
    pub samples: usize,
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64, // population standard deviation
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

/// Bounded window of the most recent frame durations
#[derive(Debug, Clone)]
pub struct FrameLog {
    times: VecDeque<Duration>,
    max_samples: usize,
}

impl FrameLog {
    pub fn new(max_samples: usize) -> Self {
        Self {
            times: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record(&mut self, d: Duration) {
        if self.times.len() >= self.max_samples {
            self.times.pop_front();
        }
        self.times.push_back(d);
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn summary(&self) -> FrameSummary {
        if self.times.is_empty() {
            return FrameSummary::default();
        }
        let n = self.times.len() as f64;
        let ns = || self.times.iter().map(|d| d.as_nanos() as f64);

        let avg = ns().sum::<f64>() / n;
        let var = ns().map(|x| (x - avg).powi(2)).sum::<f64>() / n;
        FrameSummary {
            samples: self.times.len(),
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: ns().fold(f64::INFINITY, f64::min),
            max_frame_time_ns: ns().fold(f64::NEG_INFINITY, f64::max),
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

impl Default for FrameLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}
