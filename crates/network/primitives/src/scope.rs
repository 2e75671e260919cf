#[cfg(test)]
#[path = "tests/scope.rs"]
mod tests;

use std::sync::Arc;

use crate::psk::PreSharedKey;

/// Immutable settings carried into a single host construction.
///
/// Attaching produces a new scope and leaves the parent untouched, so
/// scopes derived from one parent never observe each other's secrets.
/// The default scope carries no secret, which means an open network.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    psk: Option<Arc<PreSharedKey>>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a child scope carrying a private copy of `psk`.
    #[must_use]
    pub fn with_psk(&self, psk: &PreSharedKey) -> Self {
        Self {
            psk: Some(Arc::new(psk.clone())),
        }
    }

    #[must_use]
    pub fn psk(&self) -> Option<&PreSharedKey> {
        self.psk.as_deref()
    }

    /// Shared handle to the attached secret, used by every gate of a host.
    #[must_use]
    pub fn shared_psk(&self) -> Option<Arc<PreSharedKey>> {
        self.psk.clone()
    }

    #[must_use]
    pub const fn is_private(&self) -> bool {
        self.psk.is_some()
    }
}
