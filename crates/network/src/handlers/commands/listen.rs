use eyre::Result as EyreResult;
use multiaddr::Multiaddr;
use swarmgate_network_primitives::messages::ListenOn;
use tokio::sync::oneshot;

use super::Handler;
use crate::NetworkManager;

impl Handler<ListenOn> for NetworkManager {
    type Result = EyreResult<Multiaddr>;

    fn handle(&mut self, ListenOn(addr): ListenOn, outcome: oneshot::Sender<Self::Result>) {
        match self.swarm.listen_on(addr) {
            Ok(listener_id) => drop(self.pending_listen.insert(listener_id, outcome)),
            Err(err) => {
                let _ignored = outcome.send(Err(err.into()));
            }
        }
    }
}
