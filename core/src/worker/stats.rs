//! Worker statistics tracking

use std::time::{Duration, Instant};

/// Statistics tracked by each worker
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Successful publish attempts
    pub published: usize,

    /// Failed publish attempts
    pub failed: usize,

    /// Sessions leased from the supervisor
    pub sessions: usize,

    /// Payload bytes successfully published
    pub bytes: u64,

    /// Worker start time
    pub started_at: Option<Instant>,

    /// Worker end time
    pub ended_at: Option<Instant>,
}

impl WorkerStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Every attempt, successful or not
    pub fn attempts(&self) -> usize {
        self.published + self.failed
    }

    /// Fraction of attempts that succeeded (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        if self.attempts() == 0 {
            0.0
        } else {
            self.published as f64 / self.attempts() as f64
        }
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Attempts per second over the worker's lifetime
    pub fn attempts_per_second(&self) -> f64 {
        self.elapsed()
            .map(|d| {
                let secs = d.as_secs_f64();
                if secs > 0.0 {
                    self.attempts() as f64 / secs
                } else {
                    0.0
                }
            })
            .unwrap_or(0.0)
    }

    /// Record a successful publish of `size` bytes
    pub fn record_success(&mut self, size: u64) {
        self.published += 1;
        self.bytes += size;
    }

    /// Record a failed publish
    pub fn record_error(&mut self) {
        self.failed += 1;
    }

    /// Record a newly leased session
    pub fn record_session(&mut self) {
        self.sessions += 1;
    }

    /// Merge stats from another worker
    pub fn merge(&mut self, other: &WorkerStats) {
        self.published += other.published;
        self.failed += other.failed;
        self.sessions += other.sessions;
        self.bytes += other.bytes;
    }
}
