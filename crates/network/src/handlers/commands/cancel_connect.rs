use swarmgate_network_primitives::messages::CancelConnect;
use tracing::debug;

use crate::NetworkManager;

impl NetworkManager {
    /// Drops dials nobody waits for anymore, aborting them when no other
    /// caller still wants the peer.
    pub(crate) fn cancel_connect(&mut self, CancelConnect(peer_id): CancelConnect) {
        let expired = self
            .pending_dial
            .iter()
            .filter(|(_, (pending, outcome))| *pending == peer_id && outcome.is_closed())
            .map(|(connection_id, _)| *connection_id)
            .collect::<Vec<_>>();

        for connection_id in expired {
            drop(self.pending_dial.remove(&connection_id));
            let _ignored = self.abandoned.insert(connection_id);
        }

        let still_wanted = self.pending_dial.values().any(|(pending, _)| *pending == peer_id);

        if !still_wanted && !self.swarm.is_connected(&peer_id) {
            debug!(%peer_id, "Aborting dial past its deadline");

            let _ignored = self.swarm.disconnect_peer_id(peer_id);
        }
    }
}
