use libp2p::PeerId;
use swarmgate_network_primitives::messages::ConnectedPeers;
use tokio::sync::oneshot;

use super::Handler;
use crate::NetworkManager;

impl Handler<ConnectedPeers> for NetworkManager {
    type Result = Vec<PeerId>;

    fn handle(&mut self, _request: ConnectedPeers, outcome: oneshot::Sender<Self::Result>) {
        let _ignored = outcome.send(self.swarm.connected_peers().copied().collect());
    }
}
