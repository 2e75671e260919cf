use core::error::Error;

use eyre::eyre;
use libp2p::swarm::{DialError, SwarmEvent};
use owo_colors::OwoColorize;
use swarmgate_network_primitives::client::ConnectError;
use swarmgate_network_primitives::messages::NetworkEvent;
use tracing::{debug, info, trace, warn};

use crate::{BehaviourEvent, NetworkManager};

mod dcutr;
mod identify;
mod ping;
mod relay;

pub(crate) trait EventHandler<E> {
    fn handle(&mut self, event: E);
}

impl NetworkManager {
    pub(crate) async fn handle_swarm_event(&mut self, event: SwarmEvent<BehaviourEvent>) {
        match event {
            SwarmEvent::Behaviour(event) => match event {
                BehaviourEvent::Dcutr(event) => EventHandler::handle(self, event),
                BehaviourEvent::Identify(event) => EventHandler::handle(self, event),
                BehaviourEvent::Ping(event) => EventHandler::handle(self, event),
                BehaviourEvent::Relay(event) => EventHandler::handle(self, event),
                BehaviourEvent::Stream(()) => {}
            },
            SwarmEvent::NewListenAddr {
                listener_id,
                address,
            } => {
                info!("Listening on {}", address);

                if let Some(sender) = self.pending_listen.remove(&listener_id) {
                    let _ignored = sender.send(Ok(address.clone()));
                }

                self.emit(NetworkEvent::ListeningOn {
                    listener_id,
                    address,
                })
                .await;
            }
            SwarmEvent::ListenerClosed {
                listener_id,
                addresses,
                reason,
            } => {
                debug!(?listener_id, ?addresses, "Listener closed");

                if let Some(sender) = self.pending_listen.remove(&listener_id) {
                    let _ignored = sender.send(Err(match reason {
                        Ok(()) => eyre!("listener closed before binding an address"),
                        Err(err) => err.into(),
                    }));
                }
            }
            SwarmEvent::ListenerError { listener_id, error } => {
                warn!(?listener_id, %error, "Listener error");

                if let Some(sender) = self.pending_listen.remove(&listener_id) {
                    let _ignored = sender.send(Err(error.into()));
                }
            }
            SwarmEvent::ConnectionEstablished {
                peer_id,
                connection_id,
                endpoint,
                num_established,
                ..
            } => {
                let expired = match self.pending_dial.remove(&connection_id) {
                    Some((_, sender)) => sender.send(Ok(peer_id)).is_err(),
                    None => self.abandoned.contains(&connection_id),
                };

                if expired {
                    debug!(
                        %peer_id,
                        ?connection_id,
                        "Closing connection established past its deadline"
                    );

                    let _ignored = self.abandoned.remove(&connection_id);
                    drop(self.closing.insert(connection_id, peer_id));
                    let _ignored = self.swarm.close_connection(connection_id);
                    return;
                }

                debug!(%peer_id, ?endpoint, "{}", "Connection established".green());

                if self.reported_connections(peer_id, num_established.get()) == 1 {
                    self.emit(NetworkEvent::PeerConnected { peer_id }).await;
                }
            }
            SwarmEvent::ConnectionClosed {
                peer_id,
                connection_id,
                num_established,
                cause,
                ..
            } => {
                debug!(%peer_id, ?cause, "Connection closed");

                if self.closing.remove(&connection_id).is_some() {
                    return;
                }

                if self.reported_connections(peer_id, num_established) == 0 {
                    self.emit(NetworkEvent::PeerDisconnected { peer_id }).await;
                }
            }
            SwarmEvent::OutgoingConnectionError {
                connection_id,
                peer_id,
                error,
            } => {
                if looks_like_key_mismatch(&error) {
                    debug!(
                        ?peer_id,
                        "Transport upgrade failed, the peer may hold a different swarm key"
                    );
                }

                let _ignored = self.abandoned.remove(&connection_id);

                let Some((peer_id, sender)) = self.pending_dial.remove(&connection_id) else {
                    debug!(?peer_id, %error, "Outgoing connection failed");
                    return;
                };

                debug!(%peer_id, %error, "{}", "Dial failed".red());

                let _ignored = sender.send(Err(ConnectError::Dial {
                    peer_id,
                    reason: error.to_string(),
                }));
            }
            SwarmEvent::IncomingConnectionError {
                send_back_addr,
                error,
                ..
            } => {
                debug!(%send_back_addr, %error, "Incoming connection failed");
            }
            event => trace!("{}: {:?}", "swarm".yellow(), event),
        }
    }
}

/// Garbage above the gate fails multistream-select or Noise, or stalls
/// until the upgrade times out. Other causes fail the same way, so this
/// only ever feeds a log line.
fn looks_like_key_mismatch(error: &DialError) -> bool {
    let DialError::Transport(errors) = error else {
        return false;
    };

    errors.iter().any(|(_, error)| {
        let mut source: Option<&(dyn Error + 'static)> = Some(error);

        while let Some(error) = source {
            let message = error.to_string().to_lowercase();

            if ["negotiat", "timeout", "timed out", "noise", "decrypt"]
                .iter()
                .any(|needle| message.contains(needle))
            {
                return true;
            }

            source = error.source();
        }

        false
    })
}
