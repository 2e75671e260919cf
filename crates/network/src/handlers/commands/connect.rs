use libp2p::swarm::dial_opts::{DialOpts, PeerCondition};
use libp2p::PeerId;
use swarmgate_network_primitives::client::ConnectError;
use swarmgate_network_primitives::messages::Connect;
use tokio::sync::oneshot;
use tracing::debug;

use super::Handler;
use crate::NetworkManager;

impl Handler<Connect> for NetworkManager {
    type Result = Result<PeerId, ConnectError>;

    fn handle(&mut self, Connect(peer): Connect, outcome: oneshot::Sender<Self::Result>) {
        let peer_id = peer.peer_id;

        if outcome.is_closed() {
            return;
        }

        if peer_id == *self.swarm.local_peer_id() {
            let _ignored = outcome.send(Err(ConnectError::SelfDial));
            return;
        }

        if self.swarm.is_connected(&peer_id) {
            let _ignored = outcome.send(Ok(peer_id));
            return;
        }

        if peer.addrs.is_empty() {
            let _ignored = outcome.send(Err(ConnectError::NoAddresses(peer_id)));
            return;
        }

        let opts = DialOpts::peer_id(peer_id)
            .addresses(peer.addrs)
            .condition(PeerCondition::Always)
            .build();
        let connection_id = opts.connection_id();

        match self.swarm.dial(opts) {
            Ok(()) => {
                debug!(%peer_id, ?connection_id, "Dialing peer");
                drop(self.pending_dial.insert(connection_id, (peer_id, outcome)));
            }
            Err(err) => {
                let _ignored = outcome.send(Err(ConnectError::Dial {
                    peer_id,
                    reason: err.to_string(),
                }));
            }
        }
    }
}
