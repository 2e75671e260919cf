use core::str::FromStr;

use libp2p::PeerId;
use multiaddr::{Error as MultiaddrError, Multiaddr, Protocol};
use thiserror::Error;

/// A peer identity together with the addresses it can be dialed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddrInfo {
    pub peer_id: PeerId,
    pub addrs: Vec<Multiaddr>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AddrInfoError {
    #[error("no peer ID in address {0}")]
    MissingPeerId(Multiaddr),
    #[error(transparent)]
    Multiaddr(#[from] MultiaddrError),
}

impl AddrInfo {
    #[must_use]
    pub const fn new(peer_id: PeerId, addrs: Vec<Multiaddr>) -> Self {
        Self { peer_id, addrs }
    }

    /// Addresses with the `/p2p/<peer id>` suffix appended.
    pub fn p2p_addrs(&self) -> impl Iterator<Item = Multiaddr> + '_ {
        self.addrs
            .iter()
            .cloned()
            .map(|addr| addr.with_p2p(self.peer_id).unwrap_or_else(|addr| addr))
    }
}

impl TryFrom<Multiaddr> for AddrInfo {
    type Error = AddrInfoError;

    fn try_from(mut addr: Multiaddr) -> Result<Self, Self::Error> {
        let Some(Protocol::P2p(peer_id)) = addr.pop() else {
            return Err(AddrInfoError::MissingPeerId(addr));
        };

        let addrs = if addr.is_empty() { vec![] } else { vec![addr] };

        Ok(Self { peer_id, addrs })
    }
}

impl FromStr for AddrInfo {
    type Err = AddrInfoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Multiaddr>()?.try_into()
    }
}
