//! Failure Detection Module
//!
//! A standalone monitor process that collects heartbeats from every node and reports
//! the ones that went quiet.
//!
//! ## Core Mechanisms
//! - **Heartbeat Table**: Node id -> time of last heartbeat. Grows as nodes report in, never shrinks.
//! - **Timeout Check**: A node is failed once its last heartbeat is older than the timeout
//!   (5 seconds by default). The check is a pure read of the table.
//!
//! Nodes emit heartbeats from their own background task, see `node::heartbeat`.

pub mod detector;
pub mod handlers;
pub mod protocol;

pub use detector::{DEFAULT_HEARTBEAT_TIMEOUT, FailureDetector};
pub use handlers::router;

#[cfg(test)]
mod tests;
