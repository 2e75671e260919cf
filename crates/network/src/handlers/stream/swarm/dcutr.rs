use libp2p::dcutr::Event;
use owo_colors::OwoColorize;
use tracing::debug;

use super::{EventHandler, NetworkManager};

impl EventHandler<Event> for NetworkManager {
    fn handle(&mut self, event: Event) {
        debug!("{}: {:?}", "dcutr".yellow(), event);

        if let Err(err) = &event.result {
            debug!(peer_id=%event.remote_peer_id, %err, "Hole punch failed, staying relayed");
        }
    }
}
