//! Run controller for the load-generation lifecycle
//!
//! The RunController coordinates one complete run:
//! - Starting the session supervisor under a run-scoped cancellation token
//! - Fanning out one worker per unit of concurrency
//! - Waiting for every worker, or for an interrupt
//! - Handing the collected results to the report exactly once
//!
//! A fatal broker setup failure ends the run with an error and no report.
//!
//! # Example
//!
//! ```ignore
//! use mqbench_core::orchestrator::RunControllerBuilder;
//!
//! let controller = RunControllerBuilder::new()
//!     .config(config)
//!     .connector(Arc::new(AmqpConnector::new()))
//!     .build()?;
//!
//! let outcome = controller.run_with_signal_handling(&mut report).await?;
//! ```

mod aggregator;
mod builder;
mod executor;

pub use aggregator::{aggregate_worker_stats, AggregatedStats};
pub use builder::RunControllerBuilder;
pub use executor::{RunController, RunOutcome};
