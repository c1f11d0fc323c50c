use distributed_coordination::config::{self, Config, MonitorConfig};
use distributed_coordination::membership::{NodeId, PeerTable};
use distributed_coordination::monitor::{self, FailureDetector};
use distributed_coordination::node::client::{MonitorClient, NodeClient};
use distributed_coordination::node::{self, NodeService, NodeSettings};
use distributed_coordination::transport::{HttpTransport, PeerTransport};

use anyhow::Context;
use axum::Router;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "coordination-node",
    version,
    about = "Lamport clocks, Chandy-Lamport snapshots, Bully election and heartbeat monitoring"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one cluster member. Requires a `node` section in the config.
    Node {
        /// Override the listen address (host:port).
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Run the heartbeat monitor.
    Monitor {
        /// Override the listen address (host:port).
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Start three nodes and a monitor on loopback and drive a scripted scenario.
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    if let Some(path) = &cli.config {
        info!("Loaded configuration from {}", path);
    }

    match cli.command {
        Command::Node { bind } => run_node(config, bind).await,
        Command::Monitor { bind } => run_monitor(config.monitor, bind).await,
        Command::Demo => run_demo().await,
    }
}

async fn run_node(config: Config, bind: Option<String>) -> anyhow::Result<()> {
    let node_config = config
        .node
        .context("configuration has no `node` section")?;
    let listen = bind.unwrap_or_else(|| node_config.listen.clone());

    let transport: Arc<dyn PeerTransport> =
        Arc::new(HttpTransport::new(node_config.request_timeout()));
    let node = NodeService::new(node_config.settings(), transport);

    info!(
        "Starting node {} with {} peers",
        node.id(),
        node.peers().len()
    );
    node.start().await;

    let listener = TcpListener::bind(&listen)
        .await
        .with_context(|| format!("failed to bind {}", listen))?;
    info!("Node {} listening on {}", node.id(), listen);

    axum::serve(listener, node::router(node.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    node.shutdown().await;
    info!("Node {} shut down", node.id());

    Ok(())
}

async fn run_monitor(config: MonitorConfig, bind: Option<String>) -> anyhow::Result<()> {
    let listen = bind.unwrap_or_else(|| config.listen.clone());
    let detector = Arc::new(FailureDetector::new(config.timeout()));

    let listener = TcpListener::bind(&listen)
        .await
        .with_context(|| format!("failed to bind {}", listen))?;
    info!(
        "Monitor listening on {} (timeout {:?})",
        listen,
        detector.timeout()
    );

    axum::serve(listener, monitor::router(detector))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Monitor shut down");

    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C), then return to trigger graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}

// ------------------------------------------------------------
// Demo
// ------------------------------------------------------------

const DEMO_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(500);
const DEMO_MONITOR_TIMEOUT: Duration = Duration::from_millis(1500);
const DEMO_ELECTION_GRACE: Duration = Duration::from_secs(1);
const DEMO_PAUSE: Duration = Duration::from_millis(200);

/// An HTTP server that can be stopped on its own, simulating a crashed process.
struct Server {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl Server {
    fn spawn(listener: TcpListener, app: Router) -> Self {
        let (stop, stopped) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = stopped.await;
                })
                .await
        });

        Self { stop, handle }
    }

    async fn stop(self) {
        let _ = self.stop.send(());
        match self.handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Server exited with error: {}", e),
            Err(e) => warn!("Server task failed: {}", e),
        }
    }
}

struct DemoMember {
    node: Arc<NodeService>,
    client: NodeClient,
    server: Server,
}

async fn run_demo() -> anyhow::Result<()> {
    // Bind everything up front so every peer table is known before any node starts.
    let monitor_listener = TcpListener::bind("127.0.0.1:0").await?;
    let monitor_addr = monitor_listener.local_addr()?.to_string();

    let mut listeners = Vec::new();
    for _ in 1..=3 {
        listeners.push(TcpListener::bind("127.0.0.1:0").await?);
    }
    let mut addresses = Vec::new();
    for (index, listener) in listeners.iter().enumerate() {
        addresses.push((NodeId(index as u64 + 1), listener.local_addr()?.to_string()));
    }

    let detector = Arc::new(FailureDetector::new(DEMO_MONITOR_TIMEOUT));
    let monitor_server = Server::spawn(monitor_listener, monitor::router(detector));
    info!("Demo: monitor on {}", monitor_addr);

    let mut members = Vec::new();
    for (listener, (id, addr)) in listeners.into_iter().zip(addresses.iter()) {
        let peers = PeerTable::new(*id, addresses.iter().cloned());
        let settings = NodeSettings::new(*id, peers)
            .with_monitor(monitor_addr.clone())
            .with_heartbeat_interval(DEMO_HEARTBEAT_INTERVAL)
            .with_election_grace(DEMO_ELECTION_GRACE);

        let transport: Arc<dyn PeerTransport> = Arc::new(HttpTransport::default());
        let node = NodeService::new(settings, transport);
        node.start().await;

        let server = Server::spawn(listener, node::router(node.clone()));
        info!("Demo: node {} on {}", id, addr);

        members.push(DemoMember {
            node,
            client: NodeClient::new(addr.clone()),
            server,
        });
    }

    let monitor = MonitorClient::new(monitor_addr);
    tokio::time::sleep(DEMO_HEARTBEAT_INTERVAL * 2).await;

    let result = drive_scenario(&mut members, &monitor).await;

    for member in members {
        member.node.shutdown().await;
        member.server.stop().await;
    }
    monitor_server.stop().await;

    result
}

async fn drive_scenario(members: &mut Vec<DemoMember>, monitor: &MonitorClient) -> anyhow::Result<()> {
    let clients: Vec<NodeClient> = members.iter().map(|m| m.client.clone()).collect();
    let client = |id: u64| &clients[id as usize - 1];

    info!("=== Lamport: events ===");
    client(1).local_event("local event on node 1").await?;
    let sent = client(1).send_message(NodeId(2), "hello from node 1").await?;
    info!("Demo: node 1 clock after send: {}", sent.clock);
    client(2).local_event("local event on node 2").await?;
    client(2).send_message(NodeId(3), "hello from node 2").await?;
    client(3).send_message(NodeId(1), "hello from node 3").await?;
    match client(1).send_message(NodeId(9), "nobody home").await {
        Ok(_) => warn!("Demo: send to unknown node 9 unexpectedly succeeded"),
        Err(e) => info!("Demo: send to unknown node 9 rejected: {}", e),
    }
    for id in 1..=3 {
        info!("Demo: node {} clock = {}", id, client(id).status().await?.clock);
    }

    info!("=== Snapshot: initiating from node 1 ===");
    let initiated = client(1).initiate_snapshot().await?;
    info!(
        "Demo: {} (markers delivered to {:?})",
        initiated.status, initiated.markers.delivered
    );
    for (from, to, delta) in [(2, 1, 10), (3, 2, -5), (1, 3, 20), (3, 1, 15), (2, 3, -10)] {
        let sent = client(from).send_app_message(NodeId(to), delta).await?;
        info!(
            "Demo: node {} sent {:+} to node {}, value now {}",
            from, delta, to, sent.value
        );
        tokio::time::sleep(DEMO_PAUSE).await;
    }

    info!("=== Bully: node 3 crashes, node 1 starts an election ===");
    let crashed = members.remove(2);
    crashed.node.shutdown().await;
    crashed.server.stop().await;

    let result = client(1).start_election().await?;
    info!("Demo: election result: {}", result.result);
    for id in 1..=2 {
        info!(
            "Demo: node {} coordinator = {:?}",
            id,
            client(id).status().await?.coordinator
        );
    }

    info!("=== Heartbeat: monitoring ===");
    tokio::time::sleep(DEMO_MONITOR_TIMEOUT + DEMO_HEARTBEAT_INTERVAL).await;
    let failed = monitor.check_failures().await?;
    if failed.is_empty() {
        info!("Demo: all nodes are alive");
    } else {
        info!("Demo: failures detected on nodes {:?}", failed);
    }

    info!("=== Snapshot: collected states ===");
    for member in members.iter() {
        let snapshot = member.client.get_snapshot().await?;
        info!(
            "Demo: node {} recorded {:?}, channels {:?}, complete = {}",
            member.node.id(),
            snapshot.recorded_state,
            snapshot.channel_state,
            snapshot.complete
        );
    }

    Ok(())
}
