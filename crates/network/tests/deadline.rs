use core::net::Ipv4Addr;
use core::time::Duration;

use libp2p::multiaddr::Protocol;
use libp2p::{Multiaddr, PeerId};
use swarmgate_network::gate::NONCE_LEN;
use swarmgate_network::primitives::addr_info::AddrInfo;
use swarmgate_network::primitives::client::ConnectError;
use swarmgate_network::primitives::messages::NetworkEvent;
use tokio::io::{copy_bidirectional, AsyncReadExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout};

mod common;

use common::{host, init_tracing, key_a, open, private, DEADLINE};

fn loopback(port: u16) -> Multiaddr {
    Multiaddr::empty()
        .with(Protocol::Ip4(Ipv4Addr::LOCALHOST))
        .with(Protocol::Tcp(port))
}

fn tcp_port(addr: &Multiaddr) -> u16 {
    addr.iter()
        .find_map(|protocol| match protocol {
            Protocol::Tcp(port) => Some(port),
            _ => None,
        })
        .unwrap()
}

#[tokio::test]
async fn test_deadline_aborts_stalled_nonce_exchange() {
    init_tracing();

    let a = host(&private(&key_a())).await;

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let silent = AddrInfo::new(PeerId::random(), vec![loopback(port)]);

    let (result, accepted) = tokio::join!(
        a.connect(&silent, Duration::from_millis(500)),
        listener.accept()
    );

    assert!(matches!(result, Err(ConnectError::Timeout(peer_id)) if peer_id == silent.peer_id));

    let (mut socket, _) = accepted.unwrap();

    // Well before the transport handshake timeout.
    let mut received = Vec::new();
    let read = timeout(DEADLINE, socket.read_to_end(&mut received)).await;

    assert!(read.is_ok(), "raw connection still open after the deadline");
    assert_eq!(received.len(), NONCE_LEN);
}

#[tokio::test]
async fn test_connection_completing_after_deadline_is_closed_silently() {
    init_tracing();

    let mut a = host(&open()).await;
    let b = host(&open()).await;

    let b_port = tcp_port(&b.listen_addrs()[0]);

    // Holds the first connection back, then forwards it to `b`.
    let relay = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let relay_port = relay.local_addr().unwrap().port();
    let relay = tokio::spawn(async move {
        let (mut inbound, _) = relay.accept().await.unwrap();
        sleep(Duration::from_secs(1)).await;

        let mut outbound = TcpStream::connect((Ipv4Addr::LOCALHOST, b_port))
            .await
            .unwrap();
        let _ignored = copy_bidirectional(&mut inbound, &mut outbound).await;
    });

    let late = AddrInfo::new(b.peer_id(), vec![loopback(relay_port)]);

    let (expired, direct) = tokio::join!(a.connect(&late, Duration::from_millis(300)), async {
        sleep(Duration::from_millis(50)).await;
        a.connect(&b.addr_info(), DEADLINE).await
    });

    assert!(matches!(expired, Err(ConnectError::Timeout(_))));
    assert_eq!(direct.unwrap(), b.peer_id());

    timeout(DEADLINE, relay)
        .await
        .expect("late connection was not closed")
        .unwrap();

    let mut connected = 0;
    let mut disconnected = 0;

    while let Ok(Some(event)) = timeout(Duration::from_millis(500), a.next_event()).await {
        match event {
            NetworkEvent::PeerConnected { peer_id } if peer_id == b.peer_id() => connected += 1,
            NetworkEvent::PeerDisconnected { peer_id } if peer_id == b.peer_id() => {
                disconnected += 1;
            }
            _ => {}
        }
    }

    assert_eq!(connected, 1);
    assert_eq!(disconnected, 0);
    assert!(a.client().connected_peers().await.unwrap().contains(&b.peer_id()));
}
