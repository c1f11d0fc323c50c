//! Logical Clock Module
//!
//! Lamport clocks for causal ordering of events between nodes.
//!
//! - A local event ticks the clock.
//! - A send ticks the clock and carries the new value as the message timestamp.
//! - A receive sets the clock to `max(local, timestamp) + 1` and hands the result back
//!   to the sender, which merges it with the same rule.

pub mod lamport;

pub use lamport::{ClockError, LamportClock};

#[cfg(test)]
mod tests;
