use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::types::{GroupContact, LookupRequest};
use super::AffinityGroup;
use crate::contacts::{ContactStorage, Peer};
use crate::error::KelipsError;
use crate::transport::Transport;

/// A foreign affinity group as seen from this node.
///
/// Holds no tuples; it only maintains contacts into the group and forwards
/// inserts and lookups to the closest one. The TTL is handed over untouched
/// on the initial cross-group dispatch: the receiving home node answers
/// from its store first and only spends budget if it must forward again.
pub struct RemoteGroup {
    contact: GroupContact,
    contacts: Arc<dyn ContactStorage>,
    transport: Arc<dyn Transport>,
    // Advanced on each successful forward into the group.
    heartbeats: AtomicU64,
}

impl RemoteGroup {
    pub fn new(
        contact: GroupContact,
        contacts: Arc<dyn ContactStorage>,
        transport: Arc<dyn Transport>,
    ) -> Arc<Self> {
        Arc::new(Self {
            contact,
            contacts,
            transport,
            heartbeats: AtomicU64::new(0),
        })
    }

    pub fn heartbeats(&self) -> u64 {
        self.heartbeats.load(Ordering::Relaxed)
    }

    fn beat(&self) {
        self.heartbeats.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl AffinityGroup for RemoteGroup {
    fn is_local(&self) -> bool {
        false
    }

    fn contact(&self) -> GroupContact {
        self.contact.clone()
    }

    async fn insert(&self, key: &[u8]) -> Result<String, KelipsError> {
        let peer = self.contacts.get_closest().ok_or(KelipsError::NoContacts)?;

        let target = GroupContact::new(self.contact.id, peer.host);
        let host = self.transport.insert(&target, key).await?;
        self.beat();
        Ok(host)
    }

    async fn lookup(&self, req: &LookupRequest) -> Result<String, KelipsError> {
        let peer = self.contacts.get_closest().ok_or(KelipsError::NoContacts)?;
        if peer.host == req.originator.host {
            tracing::warn!(
                "Forwarding back to originator group={} peer={}",
                self.contact.id,
                peer.host
            );
        }

        let next = LookupRequest {
            key: req.key.clone(),
            ttl: req.ttl,
            originator: self.contact.clone(),
        };
        let target = GroupContact::new(self.contact.id, peer.host);
        let host = self.transport.lookup(&target, &next).await?;
        self.beat();
        Ok(host)
    }

    fn add_peer(&self, peer: Peer) -> Result<(), KelipsError> {
        self.contacts.add(peer)
    }

    fn remove_peer(&self, host: &str) -> Result<(), KelipsError> {
        self.contacts.remove(host)
    }

    fn start(&self) {}
}
