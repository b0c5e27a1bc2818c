//! Session supervision
//!
//! The supervisor owns the broker connection lifecycle. Workers never dial
//! on their own; they ask for a session and block until one is ready:
//!
//! 1. The supervisor pushes an empty *offer* (a one-shot slot) onto a
//!    rendezvous stream. This only completes once a worker takes it.
//! 2. It dials, opens a channel, tries to enable publisher confirms and
//!    declares an anonymous scratch queue.
//! 3. It fills the offer with the finished [`BrokerSession`].
//!
//! Because every offer is a distinct one-shot slot, a session can reach
//! at most one worker.
//!
//! # Example
//!
//! ```ignore
//! let cancel = CancellationToken::new();
//! let (offers, handle) = SessionSupervisor::new(connector, uri, DialConfig::default())
//!     .spawn(cancel.clone());
//!
//! let session = offers.request_session().await?;
//! session.publish(&message).await?;
//!
//! cancel.cancel();
//! handle.await??;
//! ```
//!
//! [`BrokerSession`]: crate::session::BrokerSession

mod executor;
mod offer;

pub use executor::SessionSupervisor;
pub use offer::{SessionOffer, SessionOffers};

#[cfg(test)]
pub(crate) use offer::offer_stream;
