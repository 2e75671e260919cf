use libp2p::relay::client::Event;
use owo_colors::OwoColorize;
use tracing::{debug, info};

use super::{EventHandler, NetworkManager};

impl EventHandler<Event> for NetworkManager {
    fn handle(&mut self, event: Event) {
        debug!("{}: {:?}", "relay".yellow(), event);

        if let Event::ReservationReqAccepted { relay_peer_id, .. } = event {
            info!(%relay_peer_id, "Relay reservation accepted");
        }
    }
}
