//! mqbench-brokers: broker client implementations
//!
//! Each module implements the `mqbench-core` capability traits
//! (`BrokerConnector`, `BrokerConnection`, `BrokerChannel`) for one wire
//! protocol.

#![warn(missing_docs)]

pub mod amqp;

pub use amqp::AmqpConnector;
