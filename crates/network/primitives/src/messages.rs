use libp2p::core::transport::ListenerId;
use libp2p::{Multiaddr, PeerId};

use crate::addr_info::AddrInfo;
use crate::stream::Stream;

#[derive(Clone, Debug)]
pub struct Connect(pub AddrInfo);

impl From<AddrInfo> for Connect {
    fn from(peer: AddrInfo) -> Self {
        Self(peer)
    }
}

/// Sent when a caller stopped waiting for a [`Connect`].
#[derive(Clone, Copy, Debug)]
pub struct CancelConnect(pub PeerId);

impl From<PeerId> for CancelConnect {
    fn from(peer_id: PeerId) -> Self {
        Self(peer_id)
    }
}

#[derive(Clone, Debug)]
pub struct ListenOn(pub Multiaddr);

impl From<Multiaddr> for ListenOn {
    fn from(addr: Multiaddr) -> Self {
        Self(addr)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ListenAddrs;

#[derive(Clone, Copy, Debug)]
pub struct OpenStream(pub PeerId);

impl From<PeerId> for OpenStream {
    fn from(peer_id: PeerId) -> Self {
        Self(peer_id)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PeerCount;

#[derive(Clone, Copy, Debug)]
pub struct ConnectedPeers;

#[derive(Clone, Copy, Debug)]
pub struct Disconnect(pub PeerId);

impl From<PeerId> for Disconnect {
    fn from(peer_id: PeerId) -> Self {
        Self(peer_id)
    }
}

/// Events emitted by a running host.
#[derive(Debug)]
#[non_exhaustive]
pub enum NetworkEvent {
    ListeningOn {
        listener_id: ListenerId,
        address: Multiaddr,
    },
    PeerConnected {
        peer_id: PeerId,
    },
    PeerDisconnected {
        peer_id: PeerId,
    },
    StreamOpened {
        peer_id: PeerId,
        stream: Box<Stream>,
    },
}
