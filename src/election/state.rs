use super::types::ElectionPhase;
use crate::membership::NodeId;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Bully election bookkeeping for one node.
///
/// The in-election flag is claimed with a compare-and-swap so two rounds can
/// never run at once on the same node. The coordinator lives in a `watch`
/// channel so a round waiting for an announcement is woken as soon as one lands.
pub struct ElectionState {
    in_election: AtomicBool,
    coordinator: watch::Sender<Option<NodeId>>,
}

impl ElectionState {
    pub fn new() -> Self {
        let (coordinator, _) = watch::channel(None);

        Self {
            in_election: AtomicBool::new(false),
            coordinator,
        }
    }

    /// Claims the election flag. `None` if a round is already running.
    ///
    /// The flag is released when the guard is dropped, including when the
    /// round's future is cancelled.
    pub fn try_begin(&self) -> Option<ElectionGuard<'_>> {
        self.in_election
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ElectionGuard { state: self })
    }

    pub fn phase(&self) -> ElectionPhase {
        if self.in_election.load(Ordering::Acquire) {
            ElectionPhase::Electing
        } else {
            ElectionPhase::Idle
        }
    }

    pub fn is_electing(&self) -> bool {
        self.phase() == ElectionPhase::Electing
    }

    /// Last known coordinator. Best effort, may be stale.
    pub fn coordinator(&self) -> Option<NodeId> {
        *self.coordinator.borrow()
    }

    /// Overwrites the coordinator unconditionally.
    pub fn set_coordinator(&self, id: NodeId) -> Option<NodeId> {
        self.coordinator.send_replace(Some(id))
    }

    /// Starts observing coordinator changes from this point on.
    pub fn watch(&self) -> CoordinatorWatch {
        CoordinatorWatch {
            rx: self.coordinator.subscribe(),
        }
    }
}

impl Default for ElectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the in-election flag for the duration of a round.
pub struct ElectionGuard<'a> {
    state: &'a ElectionState,
}

impl Drop for ElectionGuard<'_> {
    fn drop(&mut self) {
        self.state.in_election.store(false, Ordering::Release);
    }
}

/// Receives coordinator announcements made after it was created.
pub struct CoordinatorWatch {
    rx: watch::Receiver<Option<NodeId>>,
}

impl CoordinatorWatch {
    /// Waits up to `grace` for an announcement of a coordinator that outranks `local`.
    ///
    /// Returns the announced id, or `None` if nothing qualifying arrived in time.
    pub async fn announced_above(mut self, local: NodeId, grace: Duration) -> Option<NodeId> {
        let wait = async {
            loop {
                if self.rx.changed().await.is_err() {
                    return None;
                }

                let announced = *self.rx.borrow_and_update();
                if let Some(id) = announced
                    && id > local
                {
                    return Some(id);
                }
            }
        };

        tokio::time::timeout(grace, wait).await.ok().flatten()
    }
}
