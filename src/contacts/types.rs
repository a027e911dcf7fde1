use std::sync::Arc;
use std::time::Duration;

use crate::error::KelipsError;

/// A peer known to this node as a member of some affinity group.
///
/// Identity is the `ip:port` address. `rtt` is the peer's measured
/// proximity when the membership layer provides one; the metric itself is
/// implementation-defined and `None` means unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub host: String,
    pub rtt: Option<Duration>,
}

impl Peer {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            rtt: None,
        }
    }

    pub fn with_rtt(host: impl Into<String>, rtt: Duration) -> Self {
        Self {
            host: host.into(),
            rtt: Some(rtt),
        }
    }
}

/// Peer set for a single affinity group.
///
/// Same concurrency discipline as the tuple store: safe under concurrent
/// readers and writers, and snapshots taken for iteration never deadlock
/// against membership events.
pub trait ContactStorage: Send + Sync {
    /// Adds a peer; fails with `ContactExists` if already present.
    fn add(&self, peer: Peer) -> Result<(), KelipsError>;

    /// Removes a peer by address; fails with `ContactNotFound` if absent.
    fn remove(&self, host: &str) -> Result<(), KelipsError>;

    /// Snapshot of the current members.
    fn list(&self) -> Vec<Peer>;

    /// Returns the peer closest to this node, excluding the local host.
    ///
    /// Ordering is `(rtt, address)`; peers without proximity data sort last
    /// among themselves by address, which also serves as the tie-break.
    fn get_closest(&self) -> Option<Peer>;

    /// Returns one peer uniformly at random; may include the local host.
    fn get_random(&self) -> Option<Peer>;
}

/// Produces one directory per affinity group.
///
/// `home` is true for the group this node belongs to.
pub trait ContactStorageFactory: Send + Sync {
    fn new_directory(&self, group_id: u64, home: bool) -> Arc<dyn ContactStorage>;
}

/// Shared selection logic: order by `(rtt, address)`, skip the local host,
/// return the head.
pub(crate) fn closest_of(mut peers: Vec<Peer>, local_host: &str) -> Option<Peer> {
    peers.retain(|peer| peer.host != local_host);
    peers.sort_by(|a, b| {
        let a_rtt = a.rtt.unwrap_or(Duration::MAX);
        let b_rtt = b.rtt.unwrap_or(Duration::MAX);
        a_rtt.cmp(&b_rtt).then_with(|| a.host.cmp(&b.host))
    });
    peers.into_iter().next()
}

pub(crate) fn random_of(peers: Vec<Peer>) -> Option<Peer> {
    use rand::Rng;
    if peers.is_empty() {
        return None;
    }
    let idx = rand::thread_rng().gen_range(0..peers.len());
    peers.into_iter().nth(idx)
}
