use std::sync::Arc;

use dashmap::DashMap;

use super::types::{closest_of, random_of, ContactStorage, ContactStorageFactory, Peer};
use crate::error::KelipsError;

/// Self-contained in-memory directory.
pub struct InmemContacts {
    group_id: u64,
    local_host: String,
    peers: DashMap<String, Peer>,
}

impl InmemContacts {
    pub fn new(group_id: u64, local_host: impl Into<String>) -> Self {
        Self {
            group_id,
            local_host: local_host.into(),
            peers: DashMap::new(),
        }
    }
}

impl ContactStorage for InmemContacts {
    fn add(&self, peer: Peer) -> Result<(), KelipsError> {
        match self.peers.entry(peer.host.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(KelipsError::ContactExists),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(peer);
                tracing::debug!("group={} contacts={}", self.group_id, self.peers.len());
                Ok(())
            }
        }
    }

    fn remove(&self, host: &str) -> Result<(), KelipsError> {
        self.peers
            .remove(host)
            .map(|_| ())
            .ok_or(KelipsError::ContactNotFound)
    }

    fn list(&self) -> Vec<Peer> {
        self.peers.iter().map(|entry| entry.value().clone()).collect()
    }

    fn get_closest(&self) -> Option<Peer> {
        closest_of(self.list(), &self.local_host)
    }

    fn get_random(&self) -> Option<Peer> {
        random_of(self.list())
    }
}

/// Default `ContactStorageFactory`, one `InmemContacts` per group.
pub struct InmemContactsFactory {
    local_host: String,
}

impl InmemContactsFactory {
    pub fn new(local_host: impl Into<String>) -> Self {
        Self {
            local_host: local_host.into(),
        }
    }
}

impl ContactStorageFactory for InmemContactsFactory {
    fn new_directory(&self, group_id: u64, _home: bool) -> Arc<dyn ContactStorage> {
        Arc::new(InmemContacts::new(group_id, self.local_host.clone()))
    }
}
