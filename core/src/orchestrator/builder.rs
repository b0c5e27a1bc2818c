//! Builder pattern for RunController construction

use std::sync::Arc;

use crate::config::{PacingScope, WorkConfig};
use crate::error::{BenchError, BenchResult};
use crate::traits::BrokerConnector;

use super::executor::RunController;

/// Builder for creating a RunController with a validated configuration
///
/// # Example
///
/// ```ignore
/// let controller = RunControllerBuilder::new()
///     .config(WorkConfig::new("amqp://localhost:5672"))
///     .total_requests(1000)
///     .concurrency(10)
///     .connector(Arc::new(AmqpConnector::new()))
///     .build()?;
/// ```
pub struct RunControllerBuilder {
    config: WorkConfig,
    connector: Option<Arc<dyn BrokerConnector>>,
}

impl RunControllerBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: WorkConfig::default(),
            connector: None,
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: WorkConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the total request budget
    pub fn total_requests(mut self, n: usize) -> Self {
        self.config.total_requests = n;
        self
    }

    /// Set the number of workers
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Set the per-pacer rate limit (requests per second)
    pub fn rate_limit(mut self, rps: u32) -> Self {
        self.config.rate_limit = rps;
        self
    }

    /// Set the pacing scope
    pub fn pacing(mut self, pacing: PacingScope) -> Self {
        self.config.pacing = pacing;
        self
    }

    /// Set the broker connector
    pub fn connector(mut self, connector: Arc<dyn BrokerConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Build the run controller
    ///
    /// # Errors
    ///
    /// Returns an error if the connector is not set or if configuration
    /// validation fails.
    pub fn build(self) -> BenchResult<RunController> {
        let connector = self
            .connector
            .ok_or_else(|| BenchError::missing_config("connector"))?;

        self.config
            .validate()
            .map_err(|e| BenchError::config(e.to_string()))?;

        Ok(RunController::new(self.config, connector))
    }
}

impl Default for RunControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
