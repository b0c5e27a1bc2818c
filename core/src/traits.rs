//! Broker capability traits
//!
//! The engine never speaks a wire protocol itself. It drives a broker
//! through these three traits; implementations live in the `brokers/`
//! crate (AMQP via lapin) and in test mocks. Reports are rendered by a
//! [`ReportFinalizer`], implemented in the `report/` crate.

use crate::collector::ResultStream;
use crate::config::{DialConfig, OutputMode};
use crate::error::BenchResult;
use crate::message::PublishMessage;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

/// Buffer size of a session's confirmation stream
pub const CONFIRM_BUFFER: usize = 1024;

// ============================================================================
// Connector / Connection / Channel
// ============================================================================

/// Opens connections to a single broker address
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    /// Protocol identifier (e.g., "amqp")
    fn broker_name(&self) -> &str;

    /// Dial the broker at `target`
    ///
    /// Implementations must honor `dial.connect_timeout` and configure the
    /// periodic keep-alive (heartbeat) from `dial.heartbeat`.
    async fn connect(
        &self,
        target: &str,
        dial: &DialConfig,
    ) -> Result<Box<dyn BrokerConnection>, BrokerError>;
}

/// A live broker connection
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    /// Open a channel, the unit of publish operations
    async fn open_channel(&self) -> Result<Box<dyn BrokerChannel>, BrokerError>;

    /// Close the connection and every channel on it
    async fn close(&self) -> Result<(), BrokerError>;
}

/// A channel on a broker connection
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    /// Put the channel into publisher-confirm mode
    ///
    /// Returns the stream of confirmations for subsequent publishes. The
    /// stream closes once the channel is gone. An error means the broker
    /// does not support confirmations on this channel.
    async fn enable_confirms(&self) -> Result<mpsc::Receiver<Confirmation>, BrokerError>;

    /// Declare a queue and return the name the broker assigned to it
    async fn declare_queue(&self, spec: &QueueSpec) -> Result<String, BrokerError>;

    /// Publish a message without waiting for its confirmation
    ///
    /// Publishes are non-mandatory and non-immediate.
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        message: &PublishMessage,
    ) -> Result<(), BrokerError>;
}

// ============================================================================
// Protocol data
// ============================================================================

/// Broker confirmation of one published message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    /// Channel-scoped delivery tag, starting at 1
    pub delivery_tag: u64,
    /// `true` for ack, `false` for nack
    pub ack: bool,
}

impl Confirmation {
    /// Positive acknowledgment
    pub fn ack(delivery_tag: u64) -> Self {
        Self {
            delivery_tag,
            ack: true,
        }
    }

    /// Negative acknowledgment
    pub fn nack(delivery_tag: u64) -> Self {
        Self {
            delivery_tag,
            ack: false,
        }
    }
}

/// Queue declaration parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSpec {
    /// Queue name; empty lets the broker choose one
    pub name: String,
    /// Survive broker restarts
    pub durable: bool,
    /// Only usable by the declaring connection
    pub exclusive: bool,
    /// Deleted when the last consumer or the connection goes away
    pub auto_delete: bool,
}

impl QueueSpec {
    /// Anonymous, non-durable, exclusive, auto-delete scratch queue
    pub fn scratch() -> Self {
        Self {
            name: String::new(),
            durable: false,
            exclusive: true,
            auto_delete: true,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Broker-side errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrokerError {
    /// Could not establish the connection
    #[error("cannot dial broker: {0}")]
    Connect(String),

    /// Dial did not finish in time
    #[error("dial timed out after {0:?}")]
    Timeout(Duration),

    /// Could not open a channel
    #[error("cannot open channel: {0}")]
    Channel(String),

    /// Publisher confirms are not available
    #[error("publisher confirms not supported: {0}")]
    Confirms(String),

    /// Queue declaration failed
    #[error("cannot declare queue: {0}")]
    Declare(String),

    /// A single publish failed
    #[error("publish failed: {0}")]
    Publish(String),

    /// The connection or channel is already closed
    #[error("connection closed")]
    Closed,
}

impl BrokerError {
    /// Whether this error happened while building a session
    ///
    /// Setup failures end the run; everything else is recoverable.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            BrokerError::Connect(_)
                | BrokerError::Timeout(_)
                | BrokerError::Channel(_)
                | BrokerError::Declare(_)
        )
    }
}

// ============================================================================
// Reporting
// ============================================================================

/// Everything a report needs, handed over once per run
#[derive(Debug)]
pub struct FinalizeRequest {
    /// Requested total N
    pub expected: usize,
    /// Every collected result; may hold fewer than `expected` after an
    /// interrupt, or more when attempts failed
    pub results: ResultStream,
    /// Requested output mode
    pub output: OutputMode,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
    /// `false` when the run was interrupted
    pub completed: bool,
}

/// Renders the results of a run
pub trait ReportFinalizer {
    /// Drain `request.results` and render the report
    fn finalize(&mut self, request: FinalizeRequest) -> BenchResult<()>;
}
