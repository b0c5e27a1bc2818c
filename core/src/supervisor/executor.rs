//! Session supervisor loop

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::ack::AckTracker;
use crate::config::DialConfig;
use crate::error::{BenchError, BenchResult};
use crate::session::BrokerSession;
use crate::traits::{BrokerConnector, QueueSpec};

use super::offer::{offer_stream, OfferSlot, SessionOffer, SessionOffers};

/// Keeps a supply of fresh sessions for one broker address
///
/// Every iteration publishes an empty offer, waits for a worker to take
/// it, then dials and fills it. Dialing for the next worker therefore
/// overlaps with the previous worker picking up its session.
pub struct SessionSupervisor {
    connector: Arc<dyn BrokerConnector>,
    target: String,
    dial: DialConfig,
    next_id: u64,
}

impl SessionSupervisor {
    /// Create a supervisor for `target`
    pub fn new(
        connector: Arc<dyn BrokerConnector>,
        target: impl Into<String>,
        dial: DialConfig,
    ) -> Self {
        Self {
            connector,
            target: target.into(),
            dial,
            next_id: 1,
        }
    }

    /// Start the supervisor task
    ///
    /// The task stops, closing the offer stream, as soon as `cancel`
    /// fires. It also stops on the first setup failure and returns
    /// [`BenchError::Fatal`]; there is no retry.
    pub fn spawn(
        self,
        cancel: CancellationToken,
    ) -> (SessionOffers, JoinHandle<BenchResult<()>>) {
        let (offers_tx, offers) = offer_stream();
        let handle = tokio::spawn(self.run(offers_tx, cancel));
        (offers, handle)
    }

    async fn run(
        mut self,
        offers: flume::Sender<SessionOffer>,
        cancel: CancellationToken,
    ) -> BenchResult<()> {
        tracing::debug!(
            broker = self.connector.broker_name(),
            addr = %self.target,
            "Session supervisor started"
        );

        loop {
            let (slot, offer): (OfferSlot, SessionOffer) = tokio::sync::oneshot::channel();

            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                sent = offers.send_async(offer) => {
                    if sent.is_err() {
                        // Every worker handle is gone.
                        break;
                    }
                }
            }

            let established = tokio::select! {
                biased;

                _ = cancel.cancelled() => break,

                established = self.establish() => established,
            };

            let session = match established {
                Ok(session) => session,
                Err(e) => {
                    tracing::error!(addr = %self.target, error = %e, "Cannot (re)dial");
                    return Err(e);
                }
            };

            if let Err(unclaimed) = slot.send(session) {
                tracing::debug!(session_id = unclaimed.id(), "Offer abandoned, closing session");
                unclaimed.close().await;
            }
        }

        tracing::debug!(sessions = self.next_id - 1, "Session supervisor stopped");
        Ok(())
    }

    /// Dial, open a channel, enable confirms and declare the scratch queue
    async fn establish(&mut self) -> BenchResult<BrokerSession> {
        let id = self.next_id;
        self.next_id += 1;

        let connection = self
            .connector
            .connect(&self.target, &self.dial)
            .await
            .map_err(BenchError::fatal)?;

        let channel = match connection.open_channel().await {
            Ok(channel) => channel,
            Err(e) => {
                let _ = connection.close().await;
                return Err(BenchError::fatal(e));
            }
        };

        let acks = match channel.enable_confirms().await {
            Ok(confirms) => AckTracker::spawn(id, confirms),
            Err(e) if e.is_setup_failure() => {
                let _ = connection.close().await;
                return Err(BenchError::fatal(e));
            }
            Err(e) => {
                tracing::info!(session_id = id, error = %e, "Publisher confirms not supported");
                AckTracker::unsupported(id)
            }
        };

        let queue = match channel.declare_queue(&QueueSpec::scratch()).await {
            Ok(queue) => queue,
            Err(e) => {
                let _ = connection.close().await;
                return Err(BenchError::fatal(e));
            }
        };

        tracing::debug!(
            session_id = id,
            queue = %queue,
            confirms = acks.is_enabled(),
            "Session established"
        );

        Ok(BrokerSession::new(id, connection, channel, queue, acks))
    }
}

impl std::fmt::Debug for SessionSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSupervisor")
            .field("broker", &self.connector.broker_name())
            .field("target", &self.target)
            .field("dial", &self.dial)
            .finish()
    }
}
