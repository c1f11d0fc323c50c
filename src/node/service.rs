//! Node Service
//!
//! One addressable cluster member. Composes the Lamport clock, the application
//! value, the snapshot record and the election state, and performs every
//! outbound call those protocols require.
//!
//! ## Locking
//! - `state` guards clock, value and snapshot together, so the channel recording
//!   rule sees the value and the marker flags atomically with respect to
//!   concurrent arrivals. It is never held across an outbound call.
//! - `marker_gate` orders markers before later application traffic: marker
//!   fan-out holds the write side, application sends hold the read side.
//!   The read side is held for the whole delivery, so a marker that captures
//!   state here can wait up to one peer request timeout behind an app send.
//!   The upstream sender may then count that marker as failed even though it
//!   is processed.
//! - The election flag is its own atomic, see `ElectionState`.

use super::heartbeat::heartbeat_loop;
use super::protocol::ReceiveMessageRequest;
use super::types::{BroadcastReport, NodeSettings, NodeStatus, SendReport};
use crate::clock::LamportClock;
use crate::election::{ELECTION_ACK, ElectionOutcome, ElectionState};
use crate::error::NodeError;
use crate::membership::{NodeId, PeerTable};
use crate::snapshot::{SnapshotPhase, SnapshotRecord, SnapshotStatus, SnapshotView};
use crate::transport::{PeerTransport, TransportError};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

struct NodeState {
    clock: LamportClock,
    value: i64,
    snapshot: SnapshotRecord,
}

pub struct NodeService {
    id: NodeId,
    peers: PeerTable,
    monitor: Option<String>,
    heartbeat_interval: Duration,
    election_grace: Duration,
    state: Mutex<NodeState>,
    election: ElectionState,
    marker_gate: RwLock<()>,
    transport: Arc<dyn PeerTransport>,
    /// Heartbeat loop and cascaded election rounds.
    tasks: Mutex<JoinSet<()>>,
}

impl NodeService {
    pub fn new(settings: NodeSettings, transport: Arc<dyn PeerTransport>) -> Arc<Self> {
        let NodeSettings {
            id,
            peers,
            monitor,
            heartbeat_interval,
            election_grace,
        } = settings;

        let state = NodeState {
            clock: LamportClock::new(),
            value: 0,
            snapshot: SnapshotRecord::new(peers.ids()),
        };

        Arc::new(Self {
            id,
            peers,
            monitor,
            heartbeat_interval,
            election_grace,
            state: Mutex::new(state),
            election: ElectionState::new(),
            marker_gate: RwLock::new(()),
            transport,
            tasks: Mutex::new(JoinSet::new()),
        })
    }

    /// Starts the heartbeat loop if a monitor is configured.
    pub async fn start(self: &Arc<Self>) {
        let Some(monitor) = self.monitor.clone() else {
            info!("Node {} has no monitor configured, heartbeats disabled", self.id);
            return;
        };

        if self.heartbeat_interval.is_zero() {
            warn!("Node {} has a zero heartbeat interval, heartbeats disabled", self.id);
            return;
        }

        info!(
            "Node {} sending heartbeats to {} every {:?}",
            self.id, monitor, self.heartbeat_interval
        );

        let node_id = self.id;
        let transport = self.transport.clone();
        let interval = self.heartbeat_interval;

        self.spawn_task(heartbeat_loop(node_id, monitor, transport, interval))
            .await;
    }

    /// Aborts the heartbeat loop and any cascaded election still running.
    pub async fn shutdown(&self) {
        info!("Node {} shutting down background tasks", self.id);
        self.tasks.lock().await.shutdown().await;
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn peers(&self) -> &PeerTable {
        &self.peers
    }

    pub async fn clock(&self) -> u64 {
        self.state.lock().await.clock.value()
    }

    pub async fn value(&self) -> i64 {
        self.state.lock().await.value
    }

    pub fn coordinator(&self) -> Option<NodeId> {
        self.election.coordinator()
    }

    pub async fn status(&self) -> NodeStatus {
        let state = self.state.lock().await;

        NodeStatus {
            node_id: self.id,
            clock: state.clock.value(),
            value: state.value,
            coordinator: self.election.coordinator(),
            in_election: self.election.is_electing(),
            snapshot_complete: state.snapshot.is_complete(),
        }
    }

    // ------------------------------------------------------------
    // Lamport clock
    // ------------------------------------------------------------

    pub async fn local_event(&self, description: &str) -> Result<u64, NodeError> {
        let clock = self.state.lock().await.clock.tick()?;
        info!("Lamport: node {} (clock {}): {}", self.id, clock, description);
        Ok(clock)
    }

    /// Sends a timestamped message to `target`.
    ///
    /// The clock is advanced before the peer is looked up, so an unknown
    /// target still leaves the clock one step ahead. A transport failure is
    /// logged and reported in the result, not retried.
    pub async fn send_message(
        &self,
        target: NodeId,
        message: &str,
    ) -> Result<SendReport<u64>, NodeError> {
        let timestamp = self.state.lock().await.clock.tick()?;
        info!(
            "Lamport: node {} sending to node {} (clock {}): {}",
            self.id, target, timestamp, message
        );

        let addr = self.peer_address(target)?;

        let request = ReceiveMessageRequest {
            timestamp,
            message: message.to_string(),
            sender: self.id,
        };

        match self.transport.deliver_message(addr, request).await {
            Ok(remote_clock) => {
                let merged = self.state.lock().await.clock.merge_reply(remote_clock);
                match merged {
                    Ok(clock) => {
                        debug!(
                            "Lamport: node {} merged reply clock {} -> {}",
                            self.id, remote_clock, clock
                        );
                        Ok(SendReport {
                            local: clock,
                            error: None,
                        })
                    }
                    Err(e) => {
                        warn!(
                            "Lamport: node {} rejected reply clock from node {}: {}",
                            self.id, target, e
                        );
                        Ok(SendReport {
                            local: self.clock().await,
                            error: Some(e.to_string()),
                        })
                    }
                }
            }
            Err(e) => {
                warn!("Lamport: node {} failed to send to node {}: {}", self.id, target, e);
                Ok(SendReport {
                    local: self.clock().await,
                    error: Some(e.to_string()),
                })
            }
        }
    }

    /// Applies the receive rule. A timestamp the clock cannot advance past is
    /// refused and leaves the clock unchanged.
    pub async fn receive_message(
        &self,
        timestamp: u64,
        message: &str,
        sender: NodeId,
    ) -> Result<u64, NodeError> {
        let observed = self.state.lock().await.clock.observe(timestamp);
        let clock = observed.map_err(|e| {
            warn!(
                "Lamport: node {} refused message from node {}: {}",
                self.id, sender, e
            );
            e
        })?;

        info!(
            "Lamport: node {} (clock {}) received from node {} (timestamp {}): {}",
            self.id, clock, sender, timestamp, message
        );
        Ok(clock)
    }

    // ------------------------------------------------------------
    // Chandy-Lamport snapshot
    // ------------------------------------------------------------

    /// Captures local state and sends a marker to every peer.
    ///
    /// A node takes at most one snapshot. Later calls answer `AlreadyStarted`
    /// and leave the recorded state untouched.
    pub async fn initiate_snapshot(&self) -> (SnapshotStatus, BroadcastReport) {
        let _gate = self.marker_gate.write().await;

        {
            let mut state = self.state.lock().await;
            let value = state.value;
            if !state.snapshot.begin(value) {
                debug!("Snapshot: node {} already started, ignoring", self.id);
                return (SnapshotStatus::AlreadyStarted, BroadcastReport::default());
            }
            info!("Snapshot: node {} initiating, recorded state {}", self.id, value);

            // Only a node without peers is complete at the moment it begins.
            if state.snapshot.is_complete() {
                self.log_complete(&state.snapshot.view());
            }
        }

        let report = self.send_markers(None).await;

        (SnapshotStatus::Started, report)
    }

    /// Handles a marker arriving on the channel from `sender`.
    ///
    /// The first marker captures local state and forwards markers to every
    /// peer except `sender`. Every marker closes its channel.
    pub async fn receive_marker(&self, sender: NodeId) -> Result<i64, NodeError> {
        if !self.peers.contains(sender) {
            warn!("Snapshot: node {} got marker from unknown node {}", self.id, sender);
            return Err(NodeError::UnknownPeer(sender));
        }

        // Only a marker that may capture state needs the gate. Taking it
        // unconditionally would deadlock when our own fan-out loops back here.
        let recording = self.state.lock().await.snapshot.phase() == SnapshotPhase::Recording;
        let _gate = if recording {
            None
        } else {
            Some(self.marker_gate.write().await)
        };

        let (outcome, completed) = {
            let mut state = self.state.lock().await;
            let value = state.value;
            let outcome = state
                .snapshot
                .on_marker(sender, value)
                .ok_or(NodeError::UnknownPeer(sender))?;
            let completed = outcome.complete.then(|| state.snapshot.view());
            (outcome, completed)
        };

        if outcome.first {
            info!(
                "Snapshot: node {} got first marker from node {}, recorded state {}",
                self.id, sender, outcome.recorded_state
            );
            self.send_markers(Some(sender)).await;
        }

        info!("Snapshot: node {} closed channel from node {}", self.id, sender);
        if let Some(view) = completed {
            self.log_complete(&view);
        }

        Ok(outcome.recorded_state)
    }

    pub async fn get_snapshot(&self) -> SnapshotView {
        self.state.lock().await.snapshot.view()
    }

    /// Applies `delta` locally and sends it to `target`.
    ///
    /// The local value changes before the peer is looked up and is not rolled
    /// back for an unknown target.
    pub async fn send_app_message(
        &self,
        target: NodeId,
        delta: i64,
    ) -> Result<SendReport<i64>, NodeError> {
        let _gate = self.marker_gate.read().await;

        let value = {
            let mut state = self.state.lock().await;
            state.value += delta;
            state.value
        };
        info!("App: node {} applied {:+}, value now {}", self.id, delta, value);

        let addr = self.peer_address(target)?;

        match self.transport.deliver_app_message(addr, delta, self.id).await {
            Ok(_) => Ok(SendReport {
                local: value,
                error: None,
            }),
            Err(e) => {
                warn!(
                    "App: node {} failed to send app message to node {}: {}",
                    self.id, target, e
                );
                Ok(SendReport {
                    local: value,
                    error: Some(e.to_string()),
                })
            }
        }
    }

    pub async fn receive_app_message(&self, delta: i64, sender: NodeId) -> i64 {
        let mut state = self.state.lock().await;

        if state.snapshot.record_message(sender, delta) {
            info!(
                "Snapshot: node {} recorded {:+} on channel from node {}",
                self.id, delta, sender
            );
        }

        state.value += delta;
        info!(
            "App: node {} received {:+} from node {}, value now {}",
            self.id, delta, sender, state.value
        );

        state.value
    }

    async fn send_markers(&self, except: Option<NodeId>) -> BroadcastReport {
        let sender = self.id;
        let transport = &self.transport;

        self.fan_out("marker", except, |addr| async move {
            transport.deliver_marker(&addr, sender).await.map(|_| ())
        })
        .await
    }

    fn log_complete(&self, view: &SnapshotView) {
        info!(
            "Snapshot: node {} complete, state {:?}, channels {:?}",
            self.id, view.recorded_state, view.channel_state
        );
    }

    // ------------------------------------------------------------
    // Bully election
    // ------------------------------------------------------------

    /// Runs one Bully round from this node.
    pub async fn start_election(&self) -> ElectionOutcome {
        let Some(_guard) = self.election.try_begin() else {
            debug!("Bully: node {} already in an election", self.id);
            return ElectionOutcome::AlreadyInProgress;
        };

        info!("Bully: node {} starting election", self.id);

        // Subscribe before contacting anyone so an early announcement is not missed.
        let watch = self.election.watch();

        let mut answered = false;
        for (peer, addr) in self.peers.higher_than(self.id) {
            match self.transport.request_election(addr, self.id).await {
                Ok(reply) if reply == ELECTION_ACK => {
                    debug!("Bully: node {} got OK from node {}", self.id, peer);
                    answered = true;
                }
                Ok(reply) => {
                    warn!(
                        "Bully: node {} got unexpected reply {:?} from node {}",
                        self.id, reply, peer
                    );
                }
                Err(e) => {
                    warn!("Bully: node {} no answer from node {}: {}", self.id, peer, e);
                }
            }
        }

        if !answered {
            self.election.set_coordinator(self.id);
            info!("Bully: node {} becomes coordinator", self.id);

            let coordinator = self.id;
            let transport = &self.transport;
            let report = self
                .fan_out("coordinator announcement", None, |addr| async move {
                    transport.announce_coordinator(&addr, coordinator).await
                })
                .await;
            debug!(
                "Bully: node {} announced to {} of {} peers",
                self.id,
                report.delivered.len(),
                report.attempted()
            );

            return ElectionOutcome::Elected(self.id);
        }

        info!("Bully: node {} waiting for coordinator announcement", self.id);
        if watch
            .announced_above(self.id, self.election_grace)
            .await
            .is_none()
        {
            warn!(
                "Bully: node {} heard no announcement within {:?}",
                self.id, self.election_grace
            );
        }

        ElectionOutcome::Deferred(self.election.coordinator())
    }

    /// Answers an election request and contests the election from this node.
    pub async fn receive_election(self: &Arc<Self>, sender: NodeId) -> &'static str {
        info!(
            "Bully: node {} got election request from node {}, answering OK",
            self.id, sender
        );

        if !self.election.is_electing() {
            let node = Arc::clone(self);
            self.spawn_task(async move {
                let outcome = node.start_election().await;
                debug!("Bully: node {} cascaded round finished: {}", node.id, outcome);
            })
            .await;
        }

        ELECTION_ACK
    }

    /// Records `coordinator` as leader. Not validated.
    pub fn announce_coordinator(&self, coordinator: NodeId) {
        self.election.set_coordinator(coordinator);
        info!("Bully: node {} acknowledges coordinator node {}", self.id, coordinator);
    }

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------

    fn peer_address(&self, target: NodeId) -> Result<&str, NodeError> {
        self.peers.address(target).ok_or_else(|| {
            warn!("Node {}: node {} not found in peer table", self.id, target);
            NodeError::UnknownPeer(target)
        })
    }

    /// Attempts `call` once against every peer except `except`.
    ///
    /// A failing peer is logged and recorded. It never stops the loop.
    async fn fan_out<F, Fut>(&self, what: &str, except: Option<NodeId>, call: F) -> BroadcastReport
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<(), TransportError>>,
    {
        let mut report = BroadcastReport::default();

        for (peer, addr) in self.peers.iter() {
            if Some(peer) == except {
                continue;
            }

            match call(addr.to_string()).await {
                Ok(()) => report.delivered.push(peer),
                Err(e) => {
                    warn!("Node {} failed to send {} to node {}: {}", self.id, what, peer, e);
                    report.failed.push(peer);
                }
            }
        }

        report
    }

    async fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().await;

        while let Some(finished) = tasks.try_join_next() {
            if let Err(e) = finished
                && e.is_panic()
            {
                tracing::error!("Node {} background task panicked: {}", self.id, e);
            }
        }

        tasks.spawn(task);
    }
}
