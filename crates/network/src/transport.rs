#[cfg(test)]
#[path = "tests/transport.rs"]
mod tests;

use core::error::Error;
use core::time::Duration;

use either::Either;
use libp2p::core::muxing::StreamMuxerBox;
use libp2p::core::transport::{Boxed, Transport};
use libp2p::core::upgrade::Version;
use libp2p::identity::Keypair;
use libp2p::noise::Config as NoiseConfig;
use libp2p::relay::client::Transport as RelayTransport;
use libp2p::tcp::{tokio::Transport as TcpTransport, Config as TcpConfig};
use libp2p::yamux::Config as YamuxConfig;
use libp2p::PeerId;

use crate::gate::GateConfig;

/// Builds the authenticated, multiplexed transport of one host.
///
/// With a gate, every raw connection (TCP or relayed circuit) runs the nonce
/// exchange before multistream-select sees a single byte.
pub(crate) fn build(
    keypair: &Keypair,
    relay: RelayTransport,
    gate: Option<GateConfig>,
    handshake_timeout: Duration,
) -> Result<Boxed<(PeerId, StreamMuxerBox)>, Box<dyn Error + Send + Sync>> {
    let base = relay.or_transport(TcpTransport::new(TcpConfig::default().nodelay(true)));

    let raw = match gate {
        Some(gate) => Either::Left(base.and_then(move |socket, _| gate.clone().handshake(socket))),
        None => Either::Right(base),
    };

    let noise = NoiseConfig::new(keypair)?;

    Ok(raw
        .upgrade(Version::V1Lazy)
        .authenticate(noise)
        .multiplex(YamuxConfig::default())
        .timeout(handshake_timeout)
        .boxed())
}
