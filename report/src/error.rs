//! Report errors

use thiserror::Error;

/// Errors raised while rendering a report
#[derive(Error, Debug)]
pub enum ReportError {
    /// Writing to the output failed
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failed
    #[error("csv output failed: {0}")]
    Csv(#[from] csv::Error),

    /// Histogram could not be created
    #[error("histogram error: {0}")]
    Histogram(String),
}

impl From<ReportError> for mqbench_core::BenchError {
    fn from(e: ReportError) -> Self {
        mqbench_core::BenchError::report(e.to_string())
    }
}
