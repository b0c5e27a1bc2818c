//! Result aggregation from multiple workers

use std::time::Duration;

use crate::worker::WorkerStats;

/// Aggregated statistics from all workers
#[derive(Debug, Clone, Default)]
pub struct AggregatedStats {
    /// Number of workers that reported stats
    pub total_workers: usize,

    /// Total successful publishes
    pub total_published: usize,

    /// Total failed publishes
    pub total_failed: usize,

    /// Total sessions leased
    pub total_sessions: usize,

    /// Total payload bytes published
    pub total_bytes: u64,

    /// Maximum duration across all workers
    pub total_duration: Duration,

    /// Overall successful publishes per second
    pub publishes_per_second: f64,
}

impl AggregatedStats {
    /// Every attempt, successful or not
    pub fn total_attempts(&self) -> usize {
        self.total_published + self.total_failed
    }

    /// Get the success rate (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        let total = self.total_attempts();
        if total > 0 {
            self.total_published as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Aggregate statistics from multiple workers
pub fn aggregate_worker_stats(stats: &[WorkerStats]) -> AggregatedStats {
    if stats.is_empty() {
        return AggregatedStats::default();
    }

    let mut totals = WorkerStats::new();
    for s in stats {
        totals.merge(s);
    }

    // Workers run concurrently; the slowest one bounds the run.
    let total_duration = stats
        .iter()
        .filter_map(|s| s.elapsed())
        .max()
        .unwrap_or(Duration::ZERO);

    let secs = total_duration.as_secs_f64();
    let publishes_per_second = if secs > 0.0 {
        totals.published as f64 / secs
    } else {
        0.0
    };

    AggregatedStats {
        total_workers: stats.len(),
        total_published: totals.published,
        total_failed: totals.failed,
        total_sessions: totals.sessions,
        total_bytes: totals.bytes,
        total_duration,
        publishes_per_second,
    }
}
