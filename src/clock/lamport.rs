use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClockError {
    /// Advancing past `timestamp` would overflow. The clock was left unchanged.
    #[error("logical clock cannot advance past timestamp {0}")]
    Overflow(u64),
}

/// A Lamport logical clock.
///
/// The value never decreases. Every operation that represents an event moves
/// it strictly forward, or fails and leaves it untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct LamportClock(u64);

impl LamportClock {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Local event or outgoing message: advance by one and return the new time.
    pub fn tick(&mut self) -> Result<u64, ClockError> {
        self.advance_past(self.0)
    }

    /// Receive rule: `max(local, remote) + 1`.
    pub fn observe(&mut self, remote: u64) -> Result<u64, ClockError> {
        self.advance_past(self.0.max(remote))
    }

    /// Applied by a sender to the clock returned in the receiver's reply.
    ///
    /// The reply counts as an event on the sender, so this is the same rule as
    /// [`LamportClock::observe`].
    pub fn merge_reply(&mut self, reply: u64) -> Result<u64, ClockError> {
        self.observe(reply)
    }

    fn advance_past(&mut self, timestamp: u64) -> Result<u64, ClockError> {
        self.0 = timestamp
            .checked_add(1)
            .ok_or(ClockError::Overflow(timestamp))?;
        Ok(self.0)
    }
}

impl From<u64> for LamportClock {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
