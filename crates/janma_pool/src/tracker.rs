//! Sliding window of request outcomes for timeout-rate health.

use std::collections::VecDeque;

use parking_lot::Mutex;

/// Samples needed before the ratio can flag degraded health.
const MIN_SAMPLES: usize = 5;

#[derive(Debug)]
pub struct TimeoutTracker {
    window: usize,
    threshold: f64,
    outcomes: Mutex<VecDeque<bool>>,
}

impl TimeoutTracker {
    pub fn new(window: usize, threshold: f64) -> Self {
        Self {
            window: window.max(1),
            threshold,
            outcomes: Mutex::new(VecDeque::with_capacity(window.max(1))),
        }
    }

    /// Record one finished request.
    pub fn record(&self, timed_out: bool) {
        let mut outcomes = self.outcomes.lock();
        if outcomes.len() == self.window {
            outcomes.pop_front();
        }
        outcomes.push_back(timed_out);
    }

    /// Share of timeouts among the recorded outcomes, 0 when empty.
    pub fn ratio(&self) -> f64 {
        let outcomes = self.outcomes.lock();
        if outcomes.is_empty() {
            return 0.0;
        }
        outcomes.iter().filter(|t| **t).count() as f64 / outcomes.len() as f64
    }

    pub fn is_degraded(&self) -> bool {
        let enough = self.outcomes.lock().len() >= MIN_SAMPLES.min(self.window);
        enough && self.ratio() >= self.threshold
    }
}
