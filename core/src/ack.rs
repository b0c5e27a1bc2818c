//! Publisher-confirm tracking
//!
//! One tracker runs per session. It consumes the broker's confirmation
//! stream and logs every negative acknowledgment. Tracking is diagnostic
//! only: a publish attempt is classified by the immediate result of the
//! publish call, never by its later confirmation.

use crate::traits::{Confirmation, CONFIRM_BUFFER};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Counts observed over a session's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AckSummary {
    /// Positive acknowledgments
    pub acked: u64,
    /// Negative acknowledgments
    pub nacked: u64,
}

/// Background consumer of one session's confirmation stream
#[derive(Debug)]
pub struct AckTracker {
    session_id: u64,
    enabled: bool,
    handle: JoinHandle<AckSummary>,
}

impl AckTracker {
    /// Start tracking `confirms` for the given session
    ///
    /// The task ends when the stream closes, i.e. when the session's
    /// channel is gone.
    pub fn spawn(session_id: u64, confirms: mpsc::Receiver<Confirmation>) -> Self {
        Self {
            session_id,
            enabled: true,
            handle: tokio::spawn(track(session_id, confirms)),
        }
    }

    /// Tracker for a channel without publisher confirms
    ///
    /// Uses a stream that is closed from the start, so every attempt on
    /// the session counts as unacknowledged and nothing ever blocks on it.
    pub fn unsupported(session_id: u64) -> Self {
        let (_closed, confirms) = mpsc::channel(1);
        Self {
            session_id,
            enabled: false,
            handle: tokio::spawn(track(session_id, confirms)),
        }
    }

    /// Whether the broker confirms publishes on this session
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Session this tracker belongs to
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Wait for the confirmation stream to close and return the counts
    pub async fn join(self) -> AckSummary {
        self.handle.await.unwrap_or_default()
    }
}

/// Channel pair for implementations that forward confirmations
pub fn confirm_channel() -> (mpsc::Sender<Confirmation>, mpsc::Receiver<Confirmation>) {
    mpsc::channel(CONFIRM_BUFFER)
}

async fn track(session_id: u64, mut confirms: mpsc::Receiver<Confirmation>) -> AckSummary {
    let mut summary = AckSummary::default();

    while let Some(confirmation) = confirms.recv().await {
        if confirmation.ack {
            summary.acked += 1;
        } else {
            summary.nacked += 1;
            tracing::warn!(
                session_id,
                delivery_tag = confirmation.delivery_tag,
                "Broker nacked message"
            );
        }
    }

    tracing::trace!(
        session_id,
        acked = summary.acked,
        nacked = summary.nacked,
        "Confirmation stream closed"
    );
    summary
}
