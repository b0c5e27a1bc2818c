//! Worker pool (dispatcher) for publish attempts
//!
//! Each Worker is a tokio task that runs the loop
//! **lease -> pace -> publish -> report -> repeat**:
//!
//! 1. Requests a session from the supervisor's offers
//! 2. Waits for the pacer's next tick, if pacing is enabled
//! 3. Publishes the message and times the call
//! 4. Sends a `PublishResult` to the collector
//! 5. On failure, closes the session and leases a new one
//! 6. Stops once its quota of successful publishes is met
//!
//! The run controller gives every worker the same quota, `N / C` rounded
//! down. The remainder is never published.
//!
//! # Example
//!
//! ```ignore
//! use mqbench_core::worker::{Pacer, WorkerBuilder};
//!
//! let worker = WorkerBuilder::new(0)
//!     .offers(offers)
//!     .message(message)
//!     .results(collector.sender())
//!     .pacer(Arc::new(Pacer::new(100)))
//!     .quota(20)
//!     .build()?;
//!
//! let stats = worker.run().await?;
//! println!("Published: {}", stats.published);
//! ```

mod builder;
mod executor;
mod pacer;
mod stats;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use pacer::Pacer;
pub use stats::WorkerStats;
