use eyre::{eyre, Result as EyreResult};
use swarmgate_network_primitives::messages::OpenStream;
use swarmgate_network_primitives::stream::{Stream, SWARMGATE_STREAM_PROTOCOL};
use tokio::sync::oneshot;

use super::Handler;
use crate::NetworkManager;

impl Handler<OpenStream> for NetworkManager {
    type Result = EyreResult<Stream>;

    fn handle(&mut self, OpenStream(peer_id): OpenStream, outcome: oneshot::Sender<Self::Result>) {
        let mut stream_control = self.swarm.behaviour().stream.new_control();

        drop(tokio::spawn(async move {
            let result = stream_control
                .open_stream(peer_id, SWARMGATE_STREAM_PROTOCOL)
                .await
                .map(|stream| Stream::new(peer_id, stream))
                .map_err(|err| eyre!("Failed to open stream: {:?}", err));

            let _ignored = outcome.send(result);
        }));
    }
}
