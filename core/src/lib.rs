//! mqbench-core: the load-generation engine for message brokers
//!
//! This crate drives a broker through a small set of capability traits
//! and provides everything between "connect" and "report":
//!
//! - Session supervision with a rendezvous offer hand-off
//! - Publisher-confirm tracking per session
//! - A paced worker pool with an even per-worker quota
//! - Result collection and run orchestration with interrupt handling
//! - Configuration and error types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ack;
pub mod collector;
pub mod config;
pub mod error;
pub mod message;
pub mod orchestrator;
pub mod os_signals;
pub mod result;
pub mod session;
pub mod supervisor;
pub mod traits;
pub mod worker;

#[cfg(test)]
pub(crate) mod mock;

pub use collector::{ResultCollector, ResultStream};
pub use config::{ConfigError, DialConfig, OutputMode, PacingScope, WorkConfig};
pub use error::*;
pub use message::PublishMessage;
pub use orchestrator::{AggregatedStats, RunController, RunControllerBuilder, RunOutcome};
pub use result::{PublishResult, PublishStatus};
pub use session::BrokerSession;
pub use traits::*;
pub use worker::{Pacer, Worker, WorkerBuilder, WorkerStats};
