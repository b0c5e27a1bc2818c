//! Worker execution loop

use crate::collector::ResultSender;
use crate::error::BenchResult;
use crate::message::PublishMessage;
use crate::result::PublishResult;
use crate::session::BrokerSession;
use crate::supervisor::SessionOffers;

use super::pacer::Pacer;
use super::stats::WorkerStats;

use std::sync::Arc;
use std::time::Instant;

/// How a lease ended
enum LeaseEnd {
    /// Quota reached; the worker is done
    QuotaReached,
    /// A publish failed; the session is spent and a new one is needed
    SessionLost,
    /// Nobody is collecting results any more
    CollectorGone,
}

/// Worker executes publishes in a loop: lease -> pace -> publish -> report
///
/// A worker owns at most one session at a time and never shares it. Its
/// quota counts successful publishes only; a failed attempt produces a
/// Result and a fresh session, but the quota it was working on stays
/// outstanding.
pub struct Worker {
    /// Unique worker identifier
    id: usize,

    /// Session source (shared across workers)
    offers: SessionOffers,

    /// Message published on every attempt
    message: Arc<PublishMessage>,

    /// Channel sender for per-attempt results
    results: ResultSender,

    /// Pacer, either owned by this worker or shared by the pool
    pacer: Arc<Pacer>,

    /// Successful publishes to make before stopping
    quota: usize,
}

impl Worker {
    /// Create a new worker
    pub fn new(
        id: usize,
        offers: SessionOffers,
        message: Arc<PublishMessage>,
        results: ResultSender,
        pacer: Arc<Pacer>,
        quota: usize,
    ) -> Self {
        Self {
            id,
            offers,
            message,
            results,
            pacer,
            quota,
        }
    }

    /// Run the worker loop
    ///
    /// Returns WorkerStats once the quota is met. Fails with
    /// [`BenchError::SessionsClosed`] when a session is needed but the
    /// supervisor has already stopped.
    ///
    /// [`BenchError::SessionsClosed`]: crate::error::BenchError::SessionsClosed
    pub async fn run(self) -> BenchResult<WorkerStats> {
        let mut stats = WorkerStats::new();
        stats.start();
        let mut done = 0;

        tracing::debug!(worker_id = self.id, quota = self.quota, "Worker started");

        while done < self.quota {
            let session = match self.offers.request_session().await {
                Ok(session) => session,
                Err(e) => {
                    stats.stop();
                    tracing::debug!(
                        worker_id = self.id,
                        done,
                        error = %e,
                        "No session available, worker stopping"
                    );
                    return Err(e);
                }
            };
            stats.record_session();

            let end = self.drive(&session, &mut done, &mut stats).await;

            // Dropping the tracker detaches it; it ends once the channel is gone.
            let _acks = session.close().await;

            match end {
                LeaseEnd::QuotaReached => break,
                LeaseEnd::SessionLost => continue,
                LeaseEnd::CollectorGone => {
                    tracing::debug!(worker_id = self.id, "Result channel closed, worker stopping");
                    break;
                }
            }
        }

        stats.stop();
        tracing::debug!(
            worker_id = self.id,
            published = stats.published,
            failed = stats.failed,
            sessions = stats.sessions,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            rate = stats.attempts_per_second(),
            success_rate = stats.success_rate(),
            "Worker finished"
        );

        Ok(stats)
    }

    /// Publish on one session until the quota is met or an attempt fails
    async fn drive(
        &self,
        session: &BrokerSession,
        done: &mut usize,
        stats: &mut WorkerStats,
    ) -> LeaseEnd {
        while *done < self.quota {
            self.pacer.wait().await;

            let start = Instant::now();
            let outcome = session.publish(&self.message).await;
            let elapsed = start.elapsed();

            let (result, lost) = match outcome {
                Ok(()) => {
                    let size = self.message.size();
                    stats.record_success(size);
                    *done += 1;
                    (
                        PublishResult::success(self.id, session.id(), elapsed, size),
                        false,
                    )
                }
                Err(e) => {
                    stats.record_error();
                    tracing::warn!(
                        worker_id = self.id,
                        session_id = session.id(),
                        error = %e,
                        "Publish failed, replacing session"
                    );
                    (
                        PublishResult::failure(self.id, session.id(), elapsed, e.to_string()),
                        true,
                    )
                }
            };

            if self.results.send(result).await.is_err() {
                return LeaseEnd::CollectorGone;
            }
            if lost {
                return LeaseEnd::SessionLost;
            }
        }

        LeaseEnd::QuotaReached
    }

    /// Get the worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Successful publishes this worker makes
    pub fn quota(&self) -> usize {
        self.quota
    }

    /// Pacer in front of every attempt
    pub fn pacer(&self) -> &Pacer {
        &self.pacer
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("quota", &self.quota)
            .field("pacer", &self.pacer)
            .field("message_size", &self.message.size())
            .finish()
    }
}
