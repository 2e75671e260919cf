use core::time::Duration;

use libp2p::identity::Keypair;
use multiaddr::Multiaddr;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 4242;

pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_IDLE_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_EVENT_BUFFER: usize = 256;

#[derive(Debug)]
#[non_exhaustive]
pub struct NetworkConfig {
    pub identity: Keypair,

    pub swarm: SwarmConfig,
    pub host: HostOptions,
}

impl NetworkConfig {
    #[must_use]
    pub const fn new(identity: Keypair, swarm: SwarmConfig, host: HostOptions) -> Self {
        Self {
            identity,
            swarm,
            host,
        }
    }

    /// Fresh ed25519 identity listening on an ephemeral loopback TCP port.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self::new(
            Keypair::generate_ed25519(),
            SwarmConfig::loopback(),
            HostOptions::default(),
        )
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct SwarmConfig {
    pub listen: Vec<Multiaddr>,
}

impl SwarmConfig {
    #[must_use]
    pub const fn new(listen: Vec<Multiaddr>) -> Self {
        Self { listen }
    }

    #[must_use]
    pub fn loopback() -> Self {
        Self {
            listen: vec![Multiaddr::empty()
                .with(multiaddr::Protocol::Ip4([127, 0, 0, 1].into()))
                .with(multiaddr::Protocol::Tcp(0))],
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct HostOptions {
    /// Upgrade relayed connections to direct ones (DCUtR hole punching).
    #[serde(default = "bool_true")]
    pub hole_punching: bool,

    /// Upper bound for the transport upgrade, gate nonce exchange included.
    #[serde(
        rename = "handshake_timeout_ms",
        with = "serde_duration",
        default = "default_handshake_timeout"
    )]
    pub handshake_timeout: Duration,

    #[serde(
        rename = "idle_connection_timeout_ms",
        with = "serde_duration",
        default = "default_idle_connection_timeout"
    )]
    pub idle_connection_timeout: Duration,

    /// Events queued for the host owner before the event loop waits for it.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl HostOptions {
    #[must_use]
    pub const fn new(
        hole_punching: bool,
        handshake_timeout: Duration,
        idle_connection_timeout: Duration,
    ) -> Self {
        Self {
            hole_punching,
            handshake_timeout,
            idle_connection_timeout,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    #[must_use]
    pub const fn with_hole_punching(mut self, hole_punching: bool) -> Self {
        self.hole_punching = hole_punching;
        self
    }

    #[must_use]
    pub const fn with_handshake_timeout(mut self, handshake_timeout: Duration) -> Self {
        self.handshake_timeout = handshake_timeout;
        self
    }

    #[must_use]
    pub const fn with_event_buffer(mut self, event_buffer: usize) -> Self {
        self.event_buffer = event_buffer;
        self
    }
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            hole_punching: true,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            idle_connection_timeout: DEFAULT_IDLE_CONNECTION_TIMEOUT,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

const fn bool_true() -> bool {
    true
}

const fn default_handshake_timeout() -> Duration {
    DEFAULT_HANDSHAKE_TIMEOUT
}

const fn default_idle_connection_timeout() -> Duration {
    DEFAULT_IDLE_CONNECTION_TIMEOUT
}

const fn default_event_buffer() -> usize {
    DEFAULT_EVENT_BUFFER
}

pub mod serde_duration {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
