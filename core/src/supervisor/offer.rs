//! Session offers: the supervisor-to-worker hand-off

use crate::error::{BenchError, BenchResult};
use crate::session::BrokerSession;
use tokio::sync::oneshot;

/// A single-use slot that will eventually carry one session
pub type SessionOffer = oneshot::Receiver<BrokerSession>;

/// Supervisor side of an offer
pub(crate) type OfferSlot = oneshot::Sender<BrokerSession>;

/// Create the offer stream
///
/// The stream is a rendezvous channel: the supervisor can only hand out
/// an offer when some worker is waiting to take one.
pub(crate) fn offer_stream() -> (flume::Sender<SessionOffer>, SessionOffers) {
    let (tx, rx) = flume::bounded(0);
    (tx, SessionOffers { offers: rx })
}

/// Worker-side handle for requesting sessions
///
/// Cloned into every worker. Each offer is taken by exactly one worker,
/// and each filled offer carries exactly one session.
#[derive(Clone, Debug)]
pub struct SessionOffers {
    offers: flume::Receiver<SessionOffer>,
}

impl SessionOffers {
    /// Take the next offer and wait for the supervisor to fill it
    ///
    /// Fails with [`BenchError::SessionsClosed`] once the supervisor has
    /// stopped, whether through cancellation or a fatal setup error.
    pub async fn request_session(&self) -> BenchResult<BrokerSession> {
        let offer = self
            .offers
            .recv_async()
            .await
            .map_err(|_| BenchError::SessionsClosed)?;

        offer.await.map_err(|_| BenchError::SessionsClosed)
    }
}
