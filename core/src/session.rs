//! Leased broker sessions

use crate::ack::AckTracker;
use crate::message::PublishMessage;
use crate::traits::{BrokerChannel, BrokerConnection, BrokerError};

/// Exchange used for every publish (the broker's default exchange)
pub const DEFAULT_EXCHANGE: &str = "";

/// One live connection/channel pair with its scratch queue
///
/// A session is owned by exactly one worker. It is not `Clone`; moving it
/// into a worker is the lease. After a failed publish the worker closes
/// it and it is never used again.
pub struct BrokerSession {
    id: u64,
    connection: Box<dyn BrokerConnection>,
    channel: Box<dyn BrokerChannel>,
    queue: String,
    acks: AckTracker,
}

impl BrokerSession {
    /// Assemble a session from its established parts
    pub fn new(
        id: u64,
        connection: Box<dyn BrokerConnection>,
        channel: Box<dyn BrokerChannel>,
        queue: String,
        acks: AckTracker,
    ) -> Self {
        Self {
            id,
            connection,
            channel,
            queue,
            acks,
        }
    }

    /// Supervisor-assigned session identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Broker-assigned name of the scratch queue
    pub fn queue(&self) -> &str {
        &self.queue
    }

    /// Whether publisher confirms are tracked on this session
    pub fn confirms_enabled(&self) -> bool {
        self.acks.is_enabled()
    }

    /// Publish to the scratch queue through the default exchange
    pub async fn publish(&self, message: &PublishMessage) -> Result<(), BrokerError> {
        self.channel
            .publish(DEFAULT_EXCHANGE, &self.queue, message)
            .await
    }

    /// Close the session's connection
    ///
    /// Returns the acknowledgment tracker, which finishes once the
    /// confirmation stream drains.
    pub async fn close(self) -> AckTracker {
        let Self {
            id,
            connection,
            channel,
            acks,
            ..
        } = self;

        drop(channel);
        if let Err(e) = connection.close().await {
            tracing::debug!(session_id = id, error = %e, "Error closing session");
        }
        acks
    }
}

impl std::fmt::Debug for BrokerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerSession")
            .field("id", &self.id)
            .field("queue", &self.queue)
            .field("confirms", &self.acks.is_enabled())
            .finish()
    }
}
