//! Latency histogram
//!
//! Backed by HdrHistogram with microsecond precision. Reports slice the
//! range between the fastest and slowest recorded value into equal-width
//! buckets.

use std::time::Duration;

use hdrhistogram::Histogram;

use crate::error::ReportError;

/// Highest trackable latency: one hour, in microseconds
const MAX_MICROS: u64 = 3_600_000_000;

/// One histogram bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    /// Upper edge of the bucket, in seconds
    pub mark: f64,
    /// Values at or below `mark` and above the previous mark
    pub count: u64,
}

/// In-memory latency histogram
pub struct LatencyHistogram {
    histogram: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a histogram tracking up to one hour with 3 significant digits
    pub fn new() -> Result<Self, ReportError> {
        let histogram = Histogram::new_with_bounds(1, MAX_MICROS, 3)
            .map_err(|e| ReportError::Histogram(e.to_string()))?;
        Ok(Self { histogram })
    }

    /// Record a duration; values beyond the range are clamped
    pub fn record(&mut self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(MAX_MICROS);
        self.histogram.saturating_record(micros);
    }

    /// Get the number of recorded values
    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    /// Check if the histogram is empty
    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    /// Bars at `count + 1` evenly spaced marks from min to max
    ///
    /// Every recorded value lands in exactly one bucket. Returns no
    /// buckets when nothing was recorded.
    pub fn buckets(&self, count: usize) -> Vec<Bucket> {
        if self.histogram.is_empty() || count == 0 {
            return Vec::new();
        }

        let min = self.histogram.min();
        let max = self.histogram.max();
        let width = (max - min) as f64 / count as f64;

        let mut buckets: Vec<Bucket> = (0..=count)
            .map(|i| Bucket {
                mark: (min as f64 + width * i as f64) / 1_000_000.0,
                count: 0,
            })
            .collect();

        for recorded in self.histogram.iter_recorded() {
            let offset = recorded.value_iterated_to().min(max).saturating_sub(min);
            let slot = if width > 0.0 {
                (offset as f64 / width).ceil() as usize
            } else {
                0
            };
            buckets[slot.min(count)].count += recorded.count_at_value();
        }
        buckets
    }
}

impl std::fmt::Debug for LatencyHistogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatencyHistogram")
            .field("len", &self.histogram.len())
            .finish()
    }
}
