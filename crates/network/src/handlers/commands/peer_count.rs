use swarmgate_network_primitives::messages::PeerCount;
use tokio::sync::oneshot;

use super::Handler;
use crate::NetworkManager;

impl Handler<PeerCount> for NetworkManager {
    type Result = usize;

    fn handle(&mut self, _request: PeerCount, outcome: oneshot::Sender<Self::Result>) {
        let _ignored = outcome.send(self.swarm.connected_peers().count());
    }
}
