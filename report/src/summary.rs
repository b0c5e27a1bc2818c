//! Run summary computed from publish results

use std::collections::BTreeMap;
use std::time::Duration;

use mqbench_core::{PublishResult, PublishStatus};

use crate::error::ReportError;
use crate::histogram::{Bucket, LatencyHistogram};
use crate::percentiles::LatencyPercentiles;

/// Number of histogram intervals in the text report
const HISTOGRAM_BUCKETS: usize = 10;

/// Everything the text report prints
#[derive(Debug, Clone)]
pub struct Summary {
    /// Requested total N
    pub expected: usize,
    /// Results collected (successes and failures)
    pub total: usize,
    /// Successful attempts
    pub succeeded: usize,
    /// Failed attempts
    pub failed: usize,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// Whether the run finished normally
    pub completed: bool,
    /// Successful publishes per second of wall-clock time
    pub requests_per_sec: f64,
    /// Payload bytes published
    pub total_bytes: u64,
    /// Mean payload bytes per successful attempt
    pub size_per_request: u64,
    /// Latency of successful attempts, in seconds
    pub latency: LatencyPercentiles,
    /// Latency histogram of successful attempts
    pub histogram: Vec<Bucket>,
    /// Attempt count per status
    pub statuses: BTreeMap<PublishStatus, usize>,
    /// Attempt count per distinct error message
    pub errors: BTreeMap<String, usize>,
}

impl Summary {
    /// Drain `results` into a summary
    pub fn from_results<I>(
        results: I,
        expected: usize,
        elapsed: Duration,
        completed: bool,
    ) -> Result<Self, ReportError>
    where
        I: IntoIterator<Item = PublishResult>,
    {
        let mut histogram = LatencyHistogram::new()?;
        let mut latencies = Vec::new();
        let mut statuses = BTreeMap::new();
        let mut errors = BTreeMap::new();
        let mut total = 0;
        let mut total_bytes = 0;

        for result in results {
            total += 1;
            *statuses.entry(result.status).or_insert(0) += 1;

            match result.status {
                PublishStatus::Success => {
                    latencies.push(result.duration.as_secs_f64());
                    histogram.record(result.duration);
                    total_bytes += result.size;
                }
                PublishStatus::Failed => {
                    let message = result.error.unwrap_or_else(|| "unknown error".to_string());
                    *errors.entry(message).or_insert(0) += 1;
                }
            }
        }

        let succeeded = latencies.len();
        let secs = elapsed.as_secs_f64();

        Ok(Self {
            expected,
            total,
            succeeded,
            failed: total - succeeded,
            elapsed,
            completed,
            requests_per_sec: if secs > 0.0 {
                succeeded as f64 / secs
            } else {
                0.0
            },
            total_bytes,
            size_per_request: if succeeded > 0 {
                total_bytes / succeeded as u64
            } else {
                0
            },
            latency: LatencyPercentiles::from_values(&latencies),
            histogram: histogram.buckets(HISTOGRAM_BUCKETS),
            statuses,
            errors,
        })
    }

    /// Whether fewer results arrived than were requested
    pub fn is_partial(&self) -> bool {
        !self.completed || self.total < self.expected
    }
}
