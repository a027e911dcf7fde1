use std::net::SocketAddr;
use std::sync::Arc;

use super::protocol::{decode_broadcast, read_tuples, write_tuples};
use crate::contacts::Peer;
use crate::error::KelipsError;
use crate::node::Kelips;
use crate::storage::{Tuple, TupleStorage};

/// Membership callbacks consumed by a gossip pool.
pub trait MembershipEvents: Send + Sync {
    fn notify_join(&self, host: &str);
    fn notify_leave(&self, host: &str);
    fn notify_update(&self, _host: &str) {}
}

/// Message and anti-entropy callbacks consumed by a gossip pool.
pub trait PoolDelegate: Send + Sync {
    /// A broadcast frame arrived.
    fn notify_msg(&self, frame: &[u8]);

    /// A state exchange with `remote` completed; `join` marks the seeding
    /// exchange performed when a member first joins the pool.
    fn merge_remote_state(&self, remote: SocketAddr, buf: &[u8], join: bool);

    /// Snapshot of this member's state for the next exchange.
    fn local_state(&self, join: bool) -> Vec<u8>;
}

/// Cluster-wide delegate: keeps the dispatcher's contact directories in
/// sync with the global membership view. One per node.
pub struct ClusterDelegate {
    kelips: Arc<Kelips>,
}

impl ClusterDelegate {
    pub fn new(kelips: Arc<Kelips>) -> Self {
        Self { kelips }
    }
}

impl MembershipEvents for ClusterDelegate {
    fn notify_join(&self, host: &str) {
        match self.kelips.add_peer(Peer::new(host)) {
            Ok(group) => tracing::info!("New peer={} group={}", host, group),
            // Re-announced joins are expected; membership is idempotent.
            Err(KelipsError::ContactExists) => {
                tracing::debug!("Peer already known: {}", host)
            }
            Err(e) => tracing::error!("Failed to add peer: {} {}", host, e),
        }
    }

    fn notify_leave(&self, host: &str) {
        match self.kelips.remove_peer(host) {
            Ok(group) => tracing::info!("Removed peer={} group={}", host, group),
            Err(KelipsError::ContactNotFound) => {
                tracing::debug!("Unknown peer left: {}", host)
            }
            Err(e) => tracing::error!("Failed to remove peer: {} {}", host, e),
        }
    }
}

/// Home-group delegate: applies tuple traffic from the group's pool to the
/// local store and purges owners that leave.
pub struct TupleDelegate {
    /// Local advertise address, used to tell own tuples from foreign ones.
    host: String,
    tuples: Arc<dyn TupleStorage>,
}

impl TupleDelegate {
    pub fn new(host: impl Into<String>, tuples: Arc<dyn TupleStorage>) -> Self {
        Self {
            host: host.into(),
            tuples,
        }
    }

    /// Pings the keys `remote` is attesting to. Tuples owned by anyone else
    /// are dropped: rumour about a third party's liveness is not trusted,
    /// which bounds stale propagation to one hop per exchange.
    fn ping_remote_tuples(&self, remote: &str, tuples: Vec<Tuple>) {
        let keys: Vec<Vec<u8>> = tuples
            .into_iter()
            .filter(|tuple| tuple.host == remote)
            .map(|tuple| tuple.key)
            .collect();

        let pinged = self.tuples.ping(&keys);
        tracing::debug!("Pinged remote tuples={}/{} from={}", pinged, keys.len(), remote);
    }

    /// Collects the tuples owned by this node and refreshes their clocks.
    fn ping_local_tuples(&self) -> Vec<Tuple> {
        let own: Vec<Tuple> = self
            .tuples
            .list()
            .into_iter()
            .filter(|tuple| tuple.host == self.host)
            .collect();

        let keys: Vec<Vec<u8>> = own.iter().map(|tuple| tuple.key.clone()).collect();
        let pinged = self.tuples.ping(&keys);
        tracing::debug!("Pinged local tuples={}/{}", pinged, keys.len());
        own
    }
}

impl MembershipEvents for TupleDelegate {
    fn notify_join(&self, _host: &str) {}

    /// Owner-down recovery: drop every mapping that pointed at the leaver.
    /// A later insert may re-establish the keys on a live host.
    fn notify_leave(&self, host: &str) {
        let purged = self.tuples.expire_host(host);
        tracing::info!("Peer left peer={} tuples-expired={}", host, purged);
    }
}

impl PoolDelegate for TupleDelegate {
    fn notify_msg(&self, frame: &[u8]) {
        match decode_broadcast(frame) {
            Ok((from, tuples)) => {
                let total = tuples.len();
                let inserted = self.tuples.insert(tuples);
                tracing::info!("Inserted tuples: {}/{} from={}", inserted, total, from);
            }
            Err(e) => tracing::error!("Failed to parse tuples: {}", e),
        }
    }

    fn merge_remote_state(&self, remote: SocketAddr, buf: &[u8], join: bool) {
        if buf.is_empty() {
            return;
        }

        let tuples = match read_tuples(buf) {
            Ok(tuples) => tuples,
            Err(e) => {
                tracing::error!("Failed to parse tuples: {}", e);
                return;
            }
        };

        if join {
            let total = tuples.len();
            let inserted = self.tuples.insert(tuples);
            tracing::info!("Seeded tuples: {}/{} from={}", inserted, total, remote);
        } else {
            self.ping_remote_tuples(&remote.to_string(), tuples);
        }
    }

    fn local_state(&self, _join: bool) -> Vec<u8> {
        let own = self.ping_local_tuples();

        let mut buf = Vec::new();
        if let Err(e) = write_tuples(&mut buf, &own) {
            tracing::error!("Failed to snapshot tuples: {}", e);
            return Vec::new();
        }

        tracing::debug!("Sending tuples={}", own.len());
        buf
    }
}
