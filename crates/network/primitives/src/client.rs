use core::time::Duration;

use eyre::{eyre, Result as EyreResult};
use libp2p::{Multiaddr, PeerId};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::addr_info::AddrInfo;
use crate::messages::{
    CancelConnect, Connect, ConnectedPeers, Disconnect, ListenAddrs, ListenOn, OpenStream,
    PeerCount,
};
use crate::stream::Stream;

/// Failure to establish a usable connection.
///
/// A peer holding a different swarm key is reported like any other network
/// failure. There is no dedicated variant for it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConnectError {
    #[error("failed to connect to {peer_id}: {reason}")]
    Dial { peer_id: PeerId, reason: String },
    #[error("connection to {0} was not established before the deadline")]
    Timeout(PeerId),
    #[error("no addresses known for {0}")]
    NoAddresses(PeerId),
    #[error("refusing to dial the local peer")]
    SelfDial,
    #[error("network event loop is not running")]
    Shutdown,
}

#[derive(Clone, Debug)]
pub struct NetworkClient {
    sender: mpsc::Sender<NetworkMessage>,
}

#[derive(Debug)]
pub enum NetworkMessage {
    Connect {
        request: Connect,
        outcome: oneshot::Sender<Result<PeerId, ConnectError>>,
    },
    CancelConnect {
        request: CancelConnect,
    },
    ListenOn {
        request: ListenOn,
        outcome: oneshot::Sender<EyreResult<Multiaddr>>,
    },
    ListenAddrs {
        request: ListenAddrs,
        outcome: oneshot::Sender<Vec<Multiaddr>>,
    },
    OpenStream {
        request: OpenStream,
        outcome: oneshot::Sender<EyreResult<Stream>>,
    },
    PeerCount {
        request: PeerCount,
        outcome: oneshot::Sender<usize>,
    },
    ConnectedPeers {
        request: ConnectedPeers,
        outcome: oneshot::Sender<Vec<PeerId>>,
    },
    Disconnect {
        request: Disconnect,
        outcome: oneshot::Sender<bool>,
    },
}

impl NetworkClient {
    #[must_use]
    pub const fn new(sender: mpsc::Sender<NetworkMessage>) -> Self {
        Self { sender }
    }

    /// Connects to `peer`, giving up once `deadline` elapses.
    ///
    /// Succeeds immediately when a connection to the peer already exists.
    /// On expiry the dial is aborted, and a connection completing later is
    /// closed without being reported. Failed attempts are not retried.
    pub async fn connect(
        &self,
        peer: AddrInfo,
        deadline: Duration,
    ) -> Result<PeerId, ConnectError> {
        let peer_id = peer.peer_id;
        let (tx, rx) = oneshot::channel();

        self.sender
            .send(NetworkMessage::Connect {
                request: Connect::from(peer),
                outcome: tx,
            })
            .await
            .map_err(|_| ConnectError::Shutdown)?;

        match timeout(deadline, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ConnectError::Shutdown),
            Err(_) => {
                let _ignored = self
                    .sender
                    .send(NetworkMessage::CancelConnect {
                        request: CancelConnect::from(peer_id),
                    })
                    .await;

                Err(ConnectError::Timeout(peer_id))
            }
        }
    }

    /// Starts listening on `addr` and returns the first concrete address bound.
    pub async fn listen_on(&self, addr: Multiaddr) -> EyreResult<Multiaddr> {
        let (tx, rx) = oneshot::channel();

        self.send(NetworkMessage::ListenOn {
            request: ListenOn::from(addr),
            outcome: tx,
        })
        .await?;

        rx.await.map_err(|_| eyre!("network event loop dropped the request"))?
    }

    pub async fn listen_addrs(&self) -> EyreResult<Vec<Multiaddr>> {
        let (tx, rx) = oneshot::channel();

        self.send(NetworkMessage::ListenAddrs {
            request: ListenAddrs,
            outcome: tx,
        })
        .await?;

        rx.await.map_err(|_| eyre!("network event loop dropped the request"))
    }

    pub async fn open_stream(&self, peer_id: PeerId) -> EyreResult<Stream> {
        let (tx, rx) = oneshot::channel();

        self.send(NetworkMessage::OpenStream {
            request: OpenStream::from(peer_id),
            outcome: tx,
        })
        .await?;

        rx.await.map_err(|_| eyre!("network event loop dropped the request"))?
    }

    pub async fn peer_count(&self) -> EyreResult<usize> {
        let (tx, rx) = oneshot::channel();

        self.send(NetworkMessage::PeerCount {
            request: PeerCount,
            outcome: tx,
        })
        .await?;

        rx.await.map_err(|_| eyre!("network event loop dropped the request"))
    }

    pub async fn connected_peers(&self) -> EyreResult<Vec<PeerId>> {
        let (tx, rx) = oneshot::channel();

        self.send(NetworkMessage::ConnectedPeers {
            request: ConnectedPeers,
            outcome: tx,
        })
        .await?;

        rx.await.map_err(|_| eyre!("network event loop dropped the request"))
    }

    /// Closes every connection to `peer_id`; returns whether one existed.
    pub async fn disconnect(&self, peer_id: PeerId) -> EyreResult<bool> {
        let (tx, rx) = oneshot::channel();

        self.send(NetworkMessage::Disconnect {
            request: Disconnect::from(peer_id),
            outcome: tx,
        })
        .await?;

        rx.await.map_err(|_| eyre!("network event loop dropped the request"))
    }

    async fn send(&self, message: NetworkMessage) -> EyreResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| eyre!("network event loop is not running"))
    }
}
