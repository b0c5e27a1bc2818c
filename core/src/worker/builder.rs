//! Builder pattern for Worker construction

use crate::collector::ResultSender;
use crate::error::{BenchError, BenchResult};
use crate::message::PublishMessage;
use crate::supervisor::SessionOffers;

use super::executor::Worker;
use super::pacer::Pacer;

use std::sync::Arc;

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(0)
///     .offers(offers.clone())
///     .message(message.clone())
///     .results(collector.sender())
///     .pacer(Arc::new(Pacer::new(50)))
///     .quota(config.per_worker_requests())
///     .build()?;
/// ```
pub struct WorkerBuilder {
    id: usize,
    offers: Option<SessionOffers>,
    message: Option<Arc<PublishMessage>>,
    results: Option<ResultSender>,
    pacer: Option<Arc<Pacer>>,
    quota: Option<usize>,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            offers: None,
            message: None,
            results: None,
            pacer: None,
            quota: None,
        }
    }

    /// Set the session source
    pub fn offers(mut self, offers: SessionOffers) -> Self {
        self.offers = Some(offers);
        self
    }

    /// Set the message published on every attempt
    pub fn message(mut self, message: Arc<PublishMessage>) -> Self {
        self.message = Some(message);
        self
    }

    /// Set the result channel sender
    pub fn results(mut self, tx: ResultSender) -> Self {
        self.results = Some(tx);
        self
    }

    /// Set the pacer (defaults to unpaced)
    pub fn pacer(mut self, pacer: Arc<Pacer>) -> Self {
        self.pacer = Some(pacer);
        self
    }

    /// Set the number of successful publishes this worker must make
    pub fn quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if any required field is missing.
    pub fn build(self) -> BenchResult<Worker> {
        let offers = self.offers.ok_or(BenchError::missing_config("offers"))?;
        let message = self.message.ok_or(BenchError::missing_config("message"))?;
        let results = self.results.ok_or(BenchError::missing_config("results"))?;
        let quota = self.quota.ok_or(BenchError::missing_config("quota"))?;
        let pacer = self.pacer.unwrap_or_default();

        Ok(Worker::new(self.id, offers, message, results, pacer, quota))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::offer_stream;

    #[test]
    fn test_builder_missing_offers() {
        let result = WorkerBuilder::new(0)
            .message(Arc::new(PublishMessage::new("test")))
            .quota(10)
            .build();

        match result {
            Err(BenchError::MissingConfig(field)) => assert_eq!(field, "offers"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_builder_missing_results() {
        let (_tx, offers) = offer_stream();
        let result = WorkerBuilder::new(0)
            .offers(offers)
            .message(Arc::new(PublishMessage::new("test")))
            .quota(10)
            .build();

        assert!(matches!(result, Err(BenchError::MissingConfig("results"))));
    }

    #[test]
    fn test_builder_missing_quota() {
        let (_tx, offers) = offer_stream();
        let (results, _rx) = tokio::sync::mpsc::channel(1);
        let result = WorkerBuilder::new(0)
            .offers(offers)
            .message(Arc::new(PublishMessage::new("test")))
            .results(results)
            .build();

        assert!(matches!(result, Err(BenchError::MissingConfig("quota"))));
    }

    #[test]
    fn test_builder_defaults_to_unpaced() {
        let (_tx, offers) = offer_stream();
        let (results, _rx) = tokio::sync::mpsc::channel(1);
        let worker = WorkerBuilder::new(7)
            .offers(offers)
            .message(Arc::new(PublishMessage::new("test")))
            .results(results)
            .quota(3)
            .build()
            .expect("complete builder");

        assert_eq!(worker.id(), 7);
        assert_eq!(worker.quota(), 3);
        assert!(!worker.pacer().is_enabled());
    }
}
