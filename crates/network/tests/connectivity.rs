use futures_util::{SinkExt, StreamExt};
use libp2p::PeerId;
use swarmgate_network::primitives::addr_info::AddrInfo;
use swarmgate_network::new_host;
use swarmgate_network::primitives::client::ConnectError;
use swarmgate_network::primitives::config::NetworkConfig;
use swarmgate_network::primitives::messages::NetworkEvent;
use swarmgate_network::primitives::stream::Message;
use tokio::time::{sleep, timeout};

mod common;

use common::{accept_stream, host, init_tracing, key_a, key_b, open, private, DEADLINE};

#[tokio::test]
async fn test_open_hosts_connect() {
    init_tracing();

    let a = host(&open()).await;
    let b = host(&open()).await;

    assert!(!a.is_private());
    assert_eq!(a.fingerprint(), None);

    let peer_id = a.connect(&b.addr_info(), DEADLINE).await.unwrap();

    assert_eq!(peer_id, b.peer_id());
    assert!(a.client().connected_peers().await.unwrap().contains(&b.peer_id()));
}

#[tokio::test]
async fn test_same_key_hosts_round_trip_bytes() {
    init_tracing();

    let psk = key_a();
    let a = host(&private(&psk)).await;
    let mut b = host(&private(&psk)).await;

    assert!(a.is_private());
    assert_eq!(a.fingerprint(), Some(psk.fingerprint()));

    let _ = a.connect(&b.addr_info(), DEADLINE).await.unwrap();

    let payload = (0..=u8::MAX).cycle().take(64 * 1_024).collect::<Vec<_>>();

    let mut outgoing = a.open_stream(b.peer_id()).await.unwrap();
    outgoing.send(Message::new(&payload[..])).await.unwrap();

    let (peer_id, mut incoming) = accept_stream(&mut b).await;
    assert_eq!(peer_id, a.peer_id());

    let received = incoming.next().await.unwrap().unwrap();
    assert_eq!(&*received.data, &payload[..]);

    incoming.send(Message::new(&b"ack"[..])).await.unwrap();

    let reply = outgoing.next().await.unwrap().unwrap();
    assert_eq!(&*reply.data, b"ack");
}

#[tokio::test]
async fn test_private_host_rejects_open_host() {
    init_tracing();

    let gated = host(&private(&key_a())).await;
    let ungated = host(&open()).await;

    assert!(gated.connect(&ungated.addr_info(), DEADLINE).await.is_err());
    assert!(ungated.connect(&gated.addr_info(), DEADLINE).await.is_err());
}

#[tokio::test]
async fn test_different_keys_do_not_connect() {
    init_tracing();

    let a = host(&private(&key_a())).await;
    let b = host(&private(&key_b())).await;

    let err = a.connect(&b.addr_info(), DEADLINE).await.unwrap_err();

    assert!(
        matches!(err, ConnectError::Dial { .. } | ConnectError::Timeout(_)),
        "unexpected error: {err:?}"
    );
    assert!(!a.client().connected_peers().await.unwrap().contains(&b.peer_id()));
}

#[tokio::test]
async fn test_connect_is_idempotent() {
    let a = host(&open()).await;
    let b = host(&open()).await;

    let _ = a.connect(&b.addr_info(), DEADLINE).await.unwrap();
    let _ = a.connect(&b.addr_info(), DEADLINE).await.unwrap();

    assert_eq!(a.client().peer_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_connect_rejects_self_and_empty_addresses() {
    let a = host(&open()).await;

    assert!(matches!(
        a.connect(&a.addr_info(), DEADLINE).await,
        Err(ConnectError::SelfDial)
    ));

    let stranger = PeerId::random();
    assert!(matches!(
        a.connect(&AddrInfo::new(stranger, vec![]), DEADLINE).await,
        Err(ConnectError::NoAddresses(peer_id)) if peer_id == stranger
    ));
}

#[tokio::test]
async fn test_zero_deadline_never_dials() {
    let a = host(&open()).await;
    let b = host(&open()).await;

    let err = a
        .connect(&b.addr_info(), core::time::Duration::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectError::Timeout(peer_id) if peer_id == b.peer_id()));

    timeout(DEADLINE, async {
        while a.client().peer_count().await.unwrap() != 0 {
            sleep(core::time::Duration::from_millis(50)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_connection_events() {
    let mut a = host(&open()).await;
    let b = host(&open()).await;

    let _ = a.connect(&b.addr_info(), DEADLINE).await.unwrap();

    let connected = timeout(DEADLINE, async {
        loop {
            if let Some(NetworkEvent::PeerConnected { peer_id }) = a.next_event().await {
                return peer_id;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(connected, b.peer_id());

    assert!(a.client().disconnect(b.peer_id()).await.unwrap());

    let disconnected = timeout(DEADLINE, async {
        loop {
            if let Some(NetworkEvent::PeerDisconnected { peer_id }) = a.next_event().await {
                return peer_id;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(disconnected, b.peer_id());
}

#[tokio::test]
async fn test_shutdown_stops_client() {
    let a = host(&open()).await;
    let client = a.client().clone();

    a.shutdown().await;

    assert!(client.peer_count().await.is_err());
}

#[tokio::test]
async fn test_events_wait_for_slow_owner() {
    init_tracing();

    let a = host(&open()).await;

    let mut config = NetworkConfig::ephemeral();
    config.host = config.host.with_event_buffer(1);
    let mut b = new_host(&open(), config).await.unwrap();

    // `ListeningOn` already fills b's queue, so everything after it waits.
    let _ = a.connect(&b.addr_info(), DEADLINE).await.unwrap();

    let mut stream = a.open_stream(b.peer_id()).await.unwrap();
    stream.send(Message::new(&b"queued"[..])).await.unwrap();

    let mut connected = false;
    let (peer_id, mut accepted) = timeout(DEADLINE, async {
        loop {
            match b.next_event().await.unwrap() {
                NetworkEvent::PeerConnected { peer_id } => {
                    assert_eq!(peer_id, a.peer_id());
                    connected = true;
                }
                NetworkEvent::StreamOpened { peer_id, stream } => return (peer_id, *stream),
                _ => {}
            }
        }
    })
    .await
    .unwrap();

    assert!(connected);
    assert_eq!(peer_id, a.peer_id());
    assert_eq!(&*accepted.next().await.unwrap().unwrap().data, b"queued");
}
