use multiaddr::Multiaddr;
use swarmgate_network_primitives::messages::ListenAddrs;
use tokio::sync::oneshot;

use super::Handler;
use crate::NetworkManager;

impl Handler<ListenAddrs> for NetworkManager {
    type Result = Vec<Multiaddr>;

    fn handle(&mut self, _request: ListenAddrs, outcome: oneshot::Sender<Self::Result>) {
        let _ignored = outcome.send(self.swarm.listeners().cloned().collect());
    }
}
