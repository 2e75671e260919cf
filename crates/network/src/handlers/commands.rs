use swarmgate_network_primitives::client::NetworkMessage;
use tokio::sync::oneshot;

use crate::NetworkManager;

mod cancel_connect;
mod connect;
mod connected_peers;
mod disconnect;
mod listen;
mod listen_addrs;
mod open_stream;
mod peer_count;

/// Handles one client request, resolving `outcome` now or later.
pub(crate) trait Handler<M> {
    type Result;

    fn handle(&mut self, request: M, outcome: oneshot::Sender<Self::Result>);
}

impl NetworkManager {
    pub(crate) fn handle_command(&mut self, command: NetworkMessage) {
        match command {
            NetworkMessage::Connect { request, outcome } => self.handle(request, outcome),
            NetworkMessage::CancelConnect { request } => self.cancel_connect(request),
            NetworkMessage::ListenOn { request, outcome } => self.handle(request, outcome),
            NetworkMessage::ListenAddrs { request, outcome } => self.handle(request, outcome),
            NetworkMessage::OpenStream { request, outcome } => self.handle(request, outcome),
            NetworkMessage::PeerCount { request, outcome } => self.handle(request, outcome),
            NetworkMessage::ConnectedPeers { request, outcome } => self.handle(request, outcome),
            NetworkMessage::Disconnect { request, outcome } => self.handle(request, outcome),
        }
    }
}
