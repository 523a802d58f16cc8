//! Valuation metrics and statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Counters updated by the valuation worker.
///
/// Uses atomics for lock-free access across threads.
#[derive(Debug, Default)]
pub struct ValuationMetrics {
    /// Pairs valued by running trials
    pairs_valued: AtomicU64,

    /// Pairs served from a fresh cached metric
    pairs_skipped: AtomicU64,

    /// Trials run across all pairs
    trials_run: AtomicU64,

    /// Batches stopped by cancellation
    batches_cancelled: AtomicU64,

    /// Time spent valuing pairs (sum of all durations, in nanoseconds)
    total_valuation_time_nanos: AtomicU64,
}

impl ValuationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pair valued with `trials` trials.
    pub fn record_valued(&self, trials: u64, elapsed: Duration) {
        self.pairs_valued.fetch_add(1, Ordering::Relaxed);
        self.trials_run.fetch_add(trials, Ordering::Relaxed);
        self.total_valuation_time_nanos
            .fetch_add(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX), Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.pairs_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancelled(&self) {
        self.batches_cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pairs_valued(&self) -> u64 {
        self.pairs_valued.load(Ordering::Relaxed)
    }

    pub fn pairs_skipped(&self) -> u64 {
        self.pairs_skipped.load(Ordering::Relaxed)
    }

    pub fn trials_run(&self) -> u64 {
        self.trials_run.load(Ordering::Relaxed)
    }

    pub fn batches_cancelled(&self) -> u64 {
        self.batches_cancelled.load(Ordering::Relaxed)
    }

    pub fn total_valuation_time(&self) -> Duration {
        Duration::from_nanos(self.total_valuation_time_nanos.load(Ordering::Relaxed))
    }

    /// Average time spent per valued pair.
    pub fn avg_valuation_time(&self) -> Duration {
        let valued = self.pairs_valued();
        if valued == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_valuation_time_nanos.load(Ordering::Relaxed) / valued)
        }
    }

    /// Creates a snapshot of all metrics for display/logging.
    ///
    /// Note: individual fields are read atomically but the snapshot as a
    /// whole may be inconsistent while a batch is running.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pairs_valued: self.pairs_valued(),
            pairs_skipped: self.pairs_skipped(),
            trials_run: self.trials_run(),
            batches_cancelled: self.batches_cancelled(),
            total_valuation_time: self.total_valuation_time(),
            avg_valuation_time: self.avg_valuation_time(),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub pairs_valued: u64,
    pub pairs_skipped: u64,
    pub trials_run: u64,
    pub batches_cancelled: u64,
    pub total_valuation_time: Duration,
    pub avg_valuation_time: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_over_valued_pairs_only() {
        let metrics = ValuationMetrics::new();
        assert_eq!(metrics.avg_valuation_time(), Duration::ZERO);

        metrics.record_valued(1000, Duration::from_millis(30));
        metrics.record_valued(500, Duration::from_millis(10));
        metrics.record_skipped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.pairs_valued, 2);
        assert_eq!(snapshot.pairs_skipped, 1);
        assert_eq!(snapshot.trials_run, 1500);
        assert_eq!(snapshot.avg_valuation_time, Duration::from_millis(20));
    }

    #[test]
    fn oversized_durations_saturate() {
        let metrics = ValuationMetrics::new();
        metrics.record_valued(1, Duration::MAX);
        assert_eq!(metrics.total_valuation_time(), Duration::from_nanos(u64::MAX));
    }
}
