//! Progress reporting and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// What a progress sink wants the batch to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressControl {
    Continue,
    Cancel,
}

/// Receives batch progress as a fraction in `[0, 1]`.
///
/// Returning [`ProgressControl::Cancel`] stops the batch before the next
/// (artifact, build) pair; the pair in flight still completes.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: f64) -> ProgressControl;
}

impl<F> ProgressSink for F
where
    F: Fn(f64) -> ProgressControl + Send + Sync,
{
    fn report(&self, progress: f64) -> ProgressControl {
        self(progress)
    }
}

/// Shared cancellation flag, checked between pairs.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Limits how often a sink is called.
///
/// A report passes when progress has advanced by at least one whole
/// percentage point since the last passed report and `min_interval` has
/// elapsed. Completion (`1.0`) always passes, once.
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    min_interval: Duration,
    last_percent: Option<u32>,
    last_at: Option<Instant>,
    finished: bool,
}

impl ProgressThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_percent: None,
            last_at: None,
            finished: false,
        }
    }

    /// Returns true when `progress` observed at `now` should be reported.
    pub fn should_report(&mut self, progress: f64, now: Instant) -> bool {
        if self.finished {
            return false;
        }
        if progress >= 1.0 {
            self.finished = true;
            self.mark(100, now);
            return true;
        }

        let percent = (progress.max(0.0) * 100.0).floor() as u32;
        let advanced = self.last_percent.is_none_or(|last| percent > last);
        let waited = self
            .last_at
            .is_none_or(|last| now.saturating_duration_since(last) >= self.min_interval);
        if advanced && waited {
            self.mark(percent, now);
            true
        } else {
            false
        }
    }

    fn mark(&mut self, percent: u32, now: Instant) {
        self.last_percent = Some(percent);
        self.last_at = Some(now);
    }
}
