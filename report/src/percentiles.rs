//! Latency percentile calculation

use serde::Serialize;

/// Percentiles printed in the latency distribution
pub const REPORTED_PERCENTILES: [u8; 7] = [10, 25, 50, 75, 90, 95, 99];

/// Latency percentiles (all values in seconds)
#[derive(Debug, Clone, Copy, Serialize, Default, PartialEq)]
pub struct LatencyPercentiles {
    /// Minimum value
    pub min: f64,
    /// 10th percentile
    pub p10: f64,
    /// 25th percentile
    pub p25: f64,
    /// 50th percentile (median)
    pub p50: f64,
    /// 75th percentile
    pub p75: f64,
    /// 90th percentile
    pub p90: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
    /// Maximum value
    pub max: f64,
    /// Mean value
    pub mean: f64,
}

impl LatencyPercentiles {
    /// Calculate percentiles from a slice of values
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let len = sorted.len();
        let mean = sorted.iter().sum::<f64>() / len as f64;

        Self {
            min: sorted[0],
            p10: percentile(&sorted, 0.10),
            p25: percentile(&sorted, 0.25),
            p50: percentile(&sorted, 0.50),
            p75: percentile(&sorted, 0.75),
            p90: percentile(&sorted, 0.90),
            p95: percentile(&sorted, 0.95),
            p99: percentile(&sorted, 0.99),
            max: sorted[len - 1],
            mean,
        }
    }

    /// The reported percentiles paired with their values
    pub fn distribution(&self) -> [(u8, f64); 7] {
        [
            (10, self.p10),
            (25, self.p25),
            (50, self.p50),
            (75, self.p75),
            (90, self.p90),
            (95, self.p95),
            (99, self.p99),
        ]
    }
}

/// Calculate percentile from sorted values using linear interpolation
fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let idx = p * (len - 1) as f64;
            let lower = idx.floor() as usize;
            let upper = (idx.ceil() as usize).min(len - 1);
            let frac = idx - lower as f64;
            sorted[lower] * (1.0 - frac) + sorted[upper] * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentiles_empty() {
        assert_eq!(LatencyPercentiles::from_values(&[]), LatencyPercentiles::default());
    }

    #[test]
    fn test_percentiles_single_value() {
        let p = LatencyPercentiles::from_values(&[0.5]);
        assert_eq!(p.min, 0.5);
        assert_eq!(p.p10, 0.5);
        assert_eq!(p.p99, 0.5);
        assert_eq!(p.max, 0.5);
    }

    #[test]
    fn test_percentiles_interpolate() {
        let values: Vec<f64> = (1..=11).map(f64::from).collect();
        let p = LatencyPercentiles::from_values(&values);

        assert_eq!(p.min, 1.0);
        assert_eq!(p.max, 11.0);
        assert!((p.p10 - 2.0).abs() < 1e-9);
        assert!((p.p25 - 3.5).abs() < 1e-9);
        assert!((p.p50 - 6.0).abs() < 1e-9);
        assert!((p.p90 - 10.0).abs() < 1e-9);
        assert!((p.mean - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentiles_unsorted_input() {
        let p = LatencyPercentiles::from_values(&[3.0, 1.0, 2.0]);
        assert_eq!(p.min, 1.0);
        assert_eq!(p.p50, 2.0);
        assert_eq!(p.max, 3.0);
    }

    #[test]
    fn test_distribution_matches_reported_percentiles() {
        let p = LatencyPercentiles::from_values(&[1.0, 2.0]);
        let labels: Vec<u8> = p.distribution().iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, REPORTED_PERCENTILES);
    }
}
