use std::sync::Arc;

use libp2p::relay::client as relay_client;
use swarmgate_network_primitives::psk::PreSharedKey;

use super::*;

const TIMEOUT: Duration = Duration::from_secs(1);

#[tokio::test]
async fn test_builds_open_and_gated_stacks() {
    let keypair = Keypair::generate_ed25519();
    let peer_id = keypair.public().to_peer_id();

    let (relay, _behaviour) = relay_client::new(peer_id);
    assert!(build(&keypair, relay, None, TIMEOUT).is_ok());

    let gate = GateConfig::new(Arc::new(PreSharedKey::from_bytes([1; 32])));
    let (relay, _behaviour) = relay_client::new(peer_id);
    assert!(build(&keypair, relay, Some(gate), TIMEOUT).is_ok());
}
