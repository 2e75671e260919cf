use libp2p::{PeerId, Stream as P2pStream};
use swarmgate_network_primitives::messages::NetworkEvent;
use swarmgate_network_primitives::stream::Stream;
use tracing::debug;

use crate::NetworkManager;

mod swarm;

impl NetworkManager {
    pub(crate) async fn handle_incoming_stream(&mut self, peer_id: PeerId, stream: P2pStream) {
        debug!(%peer_id, "Accepted application stream");

        self.emit(NetworkEvent::StreamOpened {
            peer_id,
            stream: Box::new(Stream::new(peer_id, stream)),
        })
        .await;
    }

    /// Hands `event` to the host owner, waiting while its queue is full.
    async fn emit(&mut self, event: NetworkEvent) {
        if self.event_sender.send(event).await.is_err() {
            debug!("Host dropped its event receiver");
        }
    }
}
