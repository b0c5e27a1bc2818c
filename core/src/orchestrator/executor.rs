//! Run controller execution logic

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::collector::ResultCollector;
use crate::config::{PacingScope, WorkConfig};
use crate::error::{BenchError, BenchResult};
use crate::os_signals;
use crate::supervisor::SessionSupervisor;
use crate::traits::{BrokerConnector, FinalizeRequest, ReportFinalizer};
use crate::worker::{Pacer, WorkerBuilder, WorkerStats};

use super::aggregator::{aggregate_worker_stats, AggregatedStats};

/// How a run ended
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Every worker met its quota
    Completed(AggregatedStats),
    /// An interrupt arrived first; stats cover only the workers that had
    /// already finished
    Interrupted(AggregatedStats),
}

impl RunOutcome {
    /// Whether every worker finished
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    /// Aggregated worker statistics
    pub fn stats(&self) -> &AggregatedStats {
        match self {
            RunOutcome::Completed(stats) | RunOutcome::Interrupted(stats) => stats,
        }
    }
}

/// RunController manages one load-generation run
///
/// Starts the session supervisor and the worker pool, waits for every
/// worker (or an interrupt), and finalizes the report exactly once. All
/// `run*` methods consume the controller.
pub struct RunController {
    /// Run configuration
    pub(crate) config: WorkConfig,

    /// Broker connector (shared with the supervisor)
    pub(crate) connector: Arc<dyn BrokerConnector>,
}

impl RunController {
    /// Create a new run controller
    ///
    /// Use `RunControllerBuilder` to get a validated configuration.
    pub fn new(config: WorkConfig, connector: Arc<dyn BrokerConnector>) -> Self {
        Self { config, connector }
    }

    /// Get the run configuration
    pub fn config(&self) -> &WorkConfig {
        &self.config
    }

    /// Run to completion
    pub async fn run<F>(self, finalizer: &mut F) -> BenchResult<RunOutcome>
    where
        F: ReportFinalizer + ?Sized,
    {
        self.run_until(std::future::pending::<()>(), finalizer).await
    }

    /// Run with SIGINT/SIGTERM/SIGQUIT handling
    ///
    /// A signal finalizes the report immediately over whatever results
    /// have arrived.
    pub async fn run_with_signal_handling<F>(self, finalizer: &mut F) -> BenchResult<RunOutcome>
    where
        F: ReportFinalizer + ?Sized,
    {
        self.run_until(os_signals::interrupted(), finalizer).await
    }

    /// Run until every worker finishes or `interrupt` resolves
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::Fatal`] without finalizing when the
    /// supervisor cannot set up a session. Report errors are passed
    /// through.
    pub async fn run_until<I, F>(self, interrupt: I, finalizer: &mut F) -> BenchResult<RunOutcome>
    where
        I: Future<Output = ()>,
        F: ReportFinalizer + ?Sized,
    {
        let start = Instant::now();
        let config = self.config;
        let quota = config.per_worker_requests();

        if let Some(timeout) = config.timeout {
            tracing::warn!(
                timeout_secs = timeout.as_secs_f64(),
                "Request timeout is configured but not applied"
            );
        }

        tracing::info!(
            broker = self.connector.broker_name(),
            requests = config.total_requests,
            scheduled = config.scheduled_requests(),
            concurrency = config.concurrency,
            rate_limit = config.rate_limit,
            pacing = ?config.pacing,
            "Starting run"
        );

        let cancel = CancellationToken::new();
        // Stops the supervisor on every exit path.
        let _stop_supervisor = cancel.clone().drop_guard();

        let collector = ResultCollector::spawn(config.total_requests);
        let (offers, mut supervisor) =
            SessionSupervisor::new(Arc::clone(&self.connector), &config.target, config.dial)
                .spawn(cancel.clone());

        let message = Arc::new(config.message.clone());
        let shared_pacer = match config.pacing {
            PacingScope::Shared => Some(Arc::new(Pacer::new(config.rate_limit))),
            PacingScope::PerWorker => None,
        };

        let mut workers = JoinSet::new();
        for worker_id in 0..config.concurrency {
            let pacer = match &shared_pacer {
                Some(shared) => Arc::clone(shared),
                None => Arc::new(Pacer::new(config.rate_limit)),
            };

            let worker = WorkerBuilder::new(worker_id)
                .offers(offers.clone())
                .message(Arc::clone(&message))
                .results(collector.sender())
                .pacer(pacer)
                .quota(quota)
                .build()?;

            workers.spawn(worker.run());
        }
        // Workers hold the only remaining offer handles.
        drop(offers);

        tokio::pin!(interrupt);
        let mut finished = Vec::with_capacity(config.concurrency);
        let mut supervisor_stopped = false;

        let completed = loop {
            tokio::select! {
                biased;

                _ = &mut interrupt => break false,

                joined = &mut supervisor, if !supervisor_stopped => {
                    supervisor_stopped = true;
                    if let Err(e) = flatten(joined) {
                        workers.abort_all();
                        let _ = collector.abandon().await;
                        return Err(e);
                    }
                }

                next = workers.join_next() => match next {
                    None => break true,
                    Some(joined) => record_worker(joined, &mut finished),
                },
            }
        };

        cancel.cancel();

        let results = if completed {
            if !supervisor_stopped {
                flatten((&mut supervisor).await)?;
            }
            collector.finish().await
        } else {
            workers.abort_all();
            collector.abandon().await
        };

        let elapsed = start.elapsed();
        let aggregated = aggregate_worker_stats(&finished);
        tracing::info!(
            elapsed_secs = elapsed.as_secs_f64(),
            completed,
            results = results.remaining(),
            attempts = aggregated.total_attempts(),
            published = aggregated.total_published,
            failed = aggregated.total_failed,
            success_rate = aggregated.success_rate(),
            sessions = aggregated.total_sessions,
            rate = aggregated.publishes_per_second,
            "Run finished"
        );

        finalizer.finalize(FinalizeRequest {
            expected: config.total_requests,
            results,
            output: config.output,
            elapsed,
            completed,
        })?;

        Ok(if completed {
            RunOutcome::Completed(aggregated)
        } else {
            RunOutcome::Interrupted(aggregated)
        })
    }
}

/// Collapse a supervisor's join result
fn flatten(joined: Result<BenchResult<()>, JoinError>) -> BenchResult<()> {
    match joined {
        Ok(result) => result,
        Err(e) => Err(BenchError::orchestration(format!(
            "session supervisor panicked: {e}"
        ))),
    }
}

fn record_worker(
    joined: Result<BenchResult<WorkerStats>, JoinError>,
    finished: &mut Vec<WorkerStats>,
) {
    match joined {
        Ok(Ok(stats)) => {
            tracing::debug!(
                published = stats.published,
                failed = stats.failed,
                sessions = stats.sessions,
                "Worker completed"
            );
            finished.push(stats);
        }
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Worker stopped early");
        }
        Err(e) => {
            tracing::error!(error = %e, "Worker task panicked");
        }
    }
}

impl std::fmt::Debug for RunController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunController")
            .field("config", &self.config)
            .field("broker", &self.connector.broker_name())
            .finish()
    }
}
