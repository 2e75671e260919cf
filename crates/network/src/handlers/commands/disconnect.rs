use swarmgate_network_primitives::messages::Disconnect;
use tokio::sync::oneshot;
use tracing::debug;

use super::Handler;
use crate::NetworkManager;

impl Handler<Disconnect> for NetworkManager {
    type Result = bool;

    fn handle(&mut self, Disconnect(peer_id): Disconnect, outcome: oneshot::Sender<Self::Result>) {
        let disconnected = self.swarm.disconnect_peer_id(peer_id).is_ok();

        debug!(%peer_id, disconnected, "Disconnect requested");

        let _ignored = outcome.send(disconnected);
    }
}
