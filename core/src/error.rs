//! Error types for mqbench-core

use thiserror::Error;

use crate::traits::BrokerError;

/// Core error type
#[derive(Error, Debug)]
pub enum BenchError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A builder was asked to build without a required component
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    /// Broker setup failed; no further work is possible for this run
    #[error("fatal broker setup failure: {0}")]
    Fatal(#[source] BrokerError),

    /// The session supervisor stopped handing out sessions
    #[error("session supply closed")]
    SessionsClosed,

    /// Report finalization failed
    #[error("report error: {0}")]
    Report(String),

    /// Run orchestration error
    #[error("orchestration error: {0}")]
    Orchestration(String),
}

impl BenchError {
    /// Missing builder field
    pub fn missing_config(field: &'static str) -> Self {
        Self::MissingConfig(field)
    }

    /// Invalid configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Fatal broker setup failure
    pub fn fatal(source: BrokerError) -> Self {
        Self::Fatal(source)
    }

    /// Report rendering failure
    pub fn report(message: impl Into<String>) -> Self {
        Self::Report(message.into())
    }

    /// Orchestration failure
    pub fn orchestration(message: impl Into<String>) -> Self {
        Self::Orchestration(message.into())
    }

    /// Whether this error ends the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, BenchError::Fatal(_))
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_message() {
        let err = BenchError::missing_config("connector");
        assert_eq!(
            err.to_string(),
            "missing required configuration: connector"
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_fatal_wraps_broker_error() {
        let err = BenchError::fatal(BrokerError::Connect("connection refused".into()));
        assert!(err.is_fatal());
        assert!(err.to_string().contains("connection refused"));
    }
}
