#![allow(dead_code, reason = "Not every test binary uses every helper")]

use core::time::Duration;

use libp2p::PeerId;
use swarmgate_network::primitives::config::NetworkConfig;
use swarmgate_network::primitives::messages::NetworkEvent;
use swarmgate_network::primitives::psk::PreSharedKey;
use swarmgate_network::primitives::scope::Scope;
use swarmgate_network::primitives::stream::Stream;
use swarmgate_network::{new_host, Host};
use tokio::time::timeout;

pub const DEADLINE: Duration = Duration::from_secs(5);

pub const SWARM_KEY_A: &str = "/key/swarm/psk/1.0.0/\n/base16/\n0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef\n";
pub const SWARM_KEY_B: &str = "/key/swarm/psk/1.0.0/\n/base16/\nfedcba9876543210fedcba9876543210fedcba9876543210fedcba9876543210\n";

pub fn init_tracing() {
    let _ignored = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn key_a() -> PreSharedKey {
    SWARM_KEY_A.parse().unwrap()
}

pub fn key_b() -> PreSharedKey {
    SWARM_KEY_B.parse().unwrap()
}

pub fn open() -> Scope {
    Scope::default()
}

pub fn private(psk: &PreSharedKey) -> Scope {
    Scope::new().with_psk(psk)
}

pub async fn host(scope: &Scope) -> Host {
    new_host(scope, NetworkConfig::ephemeral()).await.unwrap()
}

/// Waits for the peer's next application stream, skipping other events.
pub async fn accept_stream(host: &mut Host) -> (PeerId, Stream) {
    timeout(DEADLINE, async {
        loop {
            match host.next_event().await {
                Some(NetworkEvent::StreamOpened { peer_id, stream }) => return (peer_id, *stream),
                Some(_) => {}
                None => panic!("event loop stopped"),
            }
        }
    })
    .await
    .unwrap()
}
