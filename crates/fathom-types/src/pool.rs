//! Pool-tier types shared between `fathom-pool` and `fathom-browser`.

use serde::{Deserialize, Serialize};

/// Which retention tier an engine adapter currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolTier {
    /// Exactly one adapter, matching the startup-default config
    /// signature. Created at startup, never evicted.
    Permanent,
    /// Reused at least the promotion threshold's worth of times.
    Hot,
    /// Recently created; eligible for eviction under the cold TTL.
    Cold,
}

/// Opaque key binding subsequent fetches to a specific page within an
/// adapter. A session id maps to at most one (adapter, page) tuple
/// globally, and is evicted after a session TTL of inactivity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionHandle(pub String);

impl SessionHandle {
    pub fn new(id: impl Into<String>) -> Self {
        SessionHandle(id.into())
    }
}

impl std::fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
