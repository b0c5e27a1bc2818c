//! Report generation for mqbench runs
//!
//! This crate turns the results of a run into output:
//!
//! - A text summary with a latency histogram, latency percentiles and an
//!   error distribution
//! - A CSV stream with one row per publish attempt
//!
//! [`ConsoleReport`] implements the core `ReportFinalizer` trait and
//! picks between the two based on the requested output mode.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod console;
mod csv_export;
mod error;
mod histogram;
mod percentiles;
mod summary;

pub use console::ConsoleReport;
pub use csv_export::write_csv;
pub use error::ReportError;
pub use histogram::{Bucket, LatencyHistogram};
pub use percentiles::{LatencyPercentiles, REPORTED_PERCENTILES};
pub use summary::Summary;

#[cfg(test)]
pub(crate) mod fixtures {
    use mqbench_core::PublishResult;
    use std::time::Duration;

    pub fn ok(ms: u64) -> PublishResult {
        PublishResult::success(0, 1, Duration::from_millis(ms), 4)
    }

    pub fn failed(ms: u64, error: &str) -> PublishResult {
        PublishResult::failure(0, 1, Duration::from_millis(ms), error)
    }
}
