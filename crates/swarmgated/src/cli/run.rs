use core::time::Duration;

use clap::Parser;
use eyre::{bail, Result as EyreResult};
use futures_util::{SinkExt, StreamExt};
use libp2p_identity::PeerId;
use owo_colors::OwoColorize;
use swarmgate_config::ConfigFile;
use swarmgate_network::new_host;
use swarmgate_network::primitives::addr_info::AddrInfo;
use swarmgate_network::primitives::messages::NetworkEvent;
use swarmgate_network::primitives::scope::Scope;
use swarmgate_network::primitives::stream::Stream;
use tokio::signal::ctrl_c;
use tokio::{select, spawn};
use tracing::{debug, info, warn};

use crate::cli::RootArgs;

/// Run a node
#[derive(Debug, Parser)]
pub struct RunCommand {
    /// Peer to dial once the node is up, as a `/.../p2p/<peer id>` multiaddr
    #[arg(long, value_name = "MULTIADDR")]
    pub dial: Vec<AddrInfo>,

    /// Give up on each dial after this many seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    pub dial_timeout: u64,
}

impl RunCommand {
    pub async fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let path = root_args.node_dir();

        if !ConfigFile::exists(&path) {
            bail!("Node is not initialized in {:?}", path);
        }

        let config = ConfigFile::load(&path)?;

        let scope = match config.load_swarm_key(&path)? {
            Some(psk) => Scope::new().with_psk(&psk),
            None => {
                warn!("No swarm key configured, joining the open network");
                Scope::default()
            }
        };

        let mut host = new_host(&scope, config.into_network_config()).await?;

        for addr in host.listen_addrs() {
            info!("Reachable at {}/p2p/{}", addr, host.peer_id());
        }

        let deadline = Duration::from_secs(self.dial_timeout);

        for peer in &self.dial {
            match host.connect(peer, deadline).await {
                Ok(peer_id) => info!(%peer_id, "Connected to peer"),
                Err(err) => warn!(peer_id=%peer.peer_id, %err, "Failed to connect to peer"),
            }
        }

        loop {
            select! {
                event = host.next_event() => {
                    let Some(event) = event else { break };
                    handle_event(event);
                }
                result = ctrl_c() => {
                    result?;
                    info!("Shutting down");
                    break;
                }
            }
        }

        host.shutdown().await;

        Ok(())
    }
}

fn handle_event(event: NetworkEvent) {
    match event {
        NetworkEvent::ListeningOn { address, .. } => debug!("Listening on {}", address),
        NetworkEvent::PeerConnected { peer_id } => info!("{} {}", "connected".green(), peer_id),
        NetworkEvent::PeerDisconnected { peer_id } => {
            info!("{} {}", "disconnected".red(), peer_id);
        }
        NetworkEvent::StreamOpened { peer_id, stream } => drop(spawn(echo(peer_id, *stream))),
        _ => {}
    }
}

/// Sends every message received on `stream` straight back.
async fn echo(peer_id: PeerId, mut stream: Stream) {
    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                warn!(%peer_id, %err, "Application stream failed");
                return;
            }
        };

        debug!(%peer_id, len = message.data.len(), "Echoing message");

        if let Err(err) = stream.send(message).await {
            warn!(%peer_id, %err, "Failed to echo message");
            return;
        }
    }

    debug!(%peer_id, "Application stream closed");
}
