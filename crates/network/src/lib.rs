use core::time::Duration;
use std::collections::hash_map::HashMap;
use std::collections::hash_set::HashSet;

use eyre::{bail, Result as EyreResult, WrapErr};
use futures_util::StreamExt;
use libp2p::core::transport::ListenerId;
use libp2p::dcutr::Behaviour as DcutrBehaviour;
use libp2p::identify::{Behaviour as IdentifyBehaviour, Config as IdentifyConfig};
use libp2p::ping::Behaviour as PingBehaviour;
use libp2p::relay::client::{self as relay_client, Behaviour as RelayBehaviour};
use libp2p::swarm::behaviour::toggle::Toggle;
use libp2p::swarm::{ConnectionId, NetworkBehaviour, Swarm};
use libp2p::{Multiaddr, PeerId, SwarmBuilder};
use libp2p_stream::{Behaviour as StreamBehaviour, IncomingStreams};
use swarmgate_network_primitives::addr_info::AddrInfo;
use swarmgate_network_primitives::client::{ConnectError, NetworkClient, NetworkMessage};
use swarmgate_network_primitives::config::NetworkConfig;
use swarmgate_network_primitives::messages::NetworkEvent;
use swarmgate_network_primitives::psk::Fingerprint;
use swarmgate_network_primitives::scope::Scope;
use swarmgate_network_primitives::stream::{Stream, SWARMGATE_STREAM_PROTOCOL};
use tokio::select;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::gate::GateConfig;

pub mod gate;
mod handlers;
mod transport;

pub use swarmgate_network_primitives as primitives;

const PROTOCOL_VERSION: &str = concat!("/", env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const COMMAND_CHANNEL_SIZE: usize = 32;

#[derive(NetworkBehaviour)]
struct Behaviour {
    dcutr: Toggle<DcutrBehaviour>,
    identify: IdentifyBehaviour,
    ping: PingBehaviour,
    relay: RelayBehaviour,
    stream: StreamBehaviour,
}

/// A running libp2p node.
///
/// Whether it only talks to peers sharing its swarm key is decided once, by
/// the [`Scope`] it was built in. Dropping the host stops its event loop.
///
/// Events must be drained with [`Host::next_event`]: once
/// `HostOptions::event_buffer` of them are queued, the event loop waits for
/// the owner instead of discarding any.
#[derive(Debug)]
pub struct Host {
    peer_id: PeerId,
    listen_addrs: Vec<Multiaddr>,
    fingerprint: Option<Fingerprint>,
    client: NetworkClient,
    events: mpsc::Receiver<NetworkEvent>,
    event_loop: JoinHandle<()>,
}

/// Builds a host, starts its event loop and waits until every configured
/// listen address is bound.
///
/// When `scope` carries a swarm key, every transport of the host is gated
/// with it. Otherwise the host joins the open network.
pub async fn new_host(scope: &Scope, config: NetworkConfig) -> EyreResult<Host> {
    let peer_id = config.identity.public().to_peer_id();
    let fingerprint = scope.psk().map(|psk| psk.fingerprint());

    let (client, events, manager) = init(peer_id, scope, &config)?;

    let event_loop = tokio::spawn(manager.run());

    let mut host = Host {
        peer_id,
        listen_addrs: Vec::new(),
        fingerprint,
        client,
        events,
        event_loop,
    };

    for addr in &config.swarm.listen {
        let _ignored = host
            .client
            .listen_on(addr.clone())
            .await
            .wrap_err_with(|| format!("failed to listen on {addr}"))?;
    }

    host.listen_addrs = host.client.listen_addrs().await?;

    match fingerprint {
        Some(fingerprint) => info!(%peer_id, %fingerprint, "Started private host"),
        None => info!(%peer_id, "Started open host"),
    }

    Ok(host)
}

fn init(
    peer_id: PeerId,
    scope: &Scope,
    config: &NetworkConfig,
) -> EyreResult<(NetworkClient, mpsc::Receiver<NetworkEvent>, NetworkManager)> {
    let gate = scope.shared_psk().map(GateConfig::new);
    let handshake_timeout = config.host.handshake_timeout;
    let hole_punching = config.host.hole_punching;

    let (relay_transport, relay_behaviour) = relay_client::new(peer_id);

    let swarm = SwarmBuilder::with_existing_identity(config.identity.clone())
        .with_tokio()
        .with_other_transport(|key| {
            transport::build(key, relay_transport, gate, handshake_timeout)
        })?
        .with_behaviour(|key| Behaviour {
            dcutr: hole_punching.then(|| DcutrBehaviour::new(peer_id)).into(),
            identify: IdentifyBehaviour::new(
                IdentifyConfig::new(PROTOCOL_VERSION.to_owned(), key.public())
                    .with_push_listen_addr_updates(true),
            ),
            ping: PingBehaviour::default(),
            relay: relay_behaviour,
            stream: StreamBehaviour::new(),
        })?
        .with_swarm_config(|cfg| {
            cfg.with_idle_connection_timeout(config.host.idle_connection_timeout)
        })
        .build();

    let incoming_streams = match swarm
        .behaviour()
        .stream
        .new_control()
        .accept(SWARMGATE_STREAM_PROTOCOL)
    {
        Ok(incoming_streams) => incoming_streams,
        Err(err) => {
            bail!("Failed to setup control for stream protocol: {:?}", err)
        }
    };

    let (command_sender, command_receiver) = mpsc::channel(COMMAND_CHANNEL_SIZE);
    let (event_sender, event_receiver) = mpsc::channel(config.host.event_buffer.max(1));

    let client = NetworkClient::new(command_sender);

    let manager = NetworkManager::new(swarm, incoming_streams, command_receiver, event_sender);

    Ok((client, event_receiver, manager))
}

impl Host {
    #[must_use]
    pub const fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    /// Concrete addresses bound when the host was built.
    #[must_use]
    pub fn listen_addrs(&self) -> &[Multiaddr] {
        &self.listen_addrs
    }

    #[must_use]
    pub fn addr_info(&self) -> AddrInfo {
        AddrInfo::new(self.peer_id, self.listen_addrs.clone())
    }

    #[must_use]
    pub const fn client(&self) -> &NetworkClient {
        &self.client
    }

    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.fingerprint.is_some()
    }

    /// Fingerprint of the swarm key gating this host, if any.
    #[must_use]
    pub const fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    /// Waits for the next event; `None` once the event loop has stopped.
    pub async fn next_event(&mut self) -> Option<NetworkEvent> {
        self.events.recv().await
    }

    pub async fn connect(
        &self,
        peer: &AddrInfo,
        deadline: Duration,
    ) -> Result<PeerId, ConnectError> {
        self.client.connect(peer.clone(), deadline).await
    }

    pub async fn open_stream(&self, peer_id: PeerId) -> EyreResult<Stream> {
        self.client.open_stream(peer_id).await
    }

    /// Stops the event loop, closing every connection of this host.
    pub async fn shutdown(mut self) {
        self.event_loop.abort();

        if let Err(err) = (&mut self.event_loop).await {
            if !err.is_cancelled() {
                debug!(%err, "Network event loop ended abnormally");
            }
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        self.event_loop.abort();
    }
}

pub(crate) struct NetworkManager {
    swarm: Box<Swarm<Behaviour>>,
    incoming_streams: Box<IncomingStreams>,
    command_receiver: mpsc::Receiver<NetworkMessage>,
    event_sender: mpsc::Sender<NetworkEvent>,
    pending_dial: HashMap<ConnectionId, (PeerId, oneshot::Sender<Result<PeerId, ConnectError>>)>,
    pending_listen: HashMap<ListenerId, oneshot::Sender<EyreResult<Multiaddr>>>,
    /// Dials whose caller gave up before the connection was established.
    abandoned: HashSet<ConnectionId>,
    /// Connections established past their deadline, closed without events.
    closing: HashMap<ConnectionId, PeerId>,
}

impl NetworkManager {
    fn new(
        swarm: Swarm<Behaviour>,
        incoming_streams: IncomingStreams,
        command_receiver: mpsc::Receiver<NetworkMessage>,
        event_sender: mpsc::Sender<NetworkEvent>,
    ) -> Self {
        Self {
            swarm: Box::new(swarm),
            incoming_streams: Box::new(incoming_streams),
            command_receiver,
            event_sender,
            pending_dial: HashMap::default(),
            pending_listen: HashMap::default(),
            abandoned: HashSet::default(),
            closing: HashMap::default(),
        }
    }

    pub(crate) async fn run(mut self) {
        #[expect(clippy::redundant_pub_crate, reason = "Needed for Tokio code")]
        loop {
            select! {
                event = self.swarm.next() => {
                    let Some(event) = event else { break };
                    self.handle_swarm_event(event).await;
                }
                incoming = self.incoming_streams.next() => {
                    let Some((peer_id, stream)) = incoming else { break };
                    self.handle_incoming_stream(peer_id, stream).await;
                }
                command = self.command_receiver.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command);
                }
            }
        }

        debug!(peer_id=%self.swarm.local_peer_id(), "Network event loop stopped");
    }

    /// Established connections to `peer_id` that upper layers know about.
    fn reported_connections(&self, peer_id: PeerId, num_established: u32) -> u32 {
        let closing = self
            .closing
            .values()
            .filter(|closing| **closing == peer_id)
            .count();

        num_established.saturating_sub(u32::try_from(closing).unwrap_or(u32::MAX))
    }
}
