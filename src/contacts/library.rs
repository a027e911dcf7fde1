use std::sync::Arc;

use dashmap::DashSet;

use super::types::{closest_of, random_of, ContactStorage, ContactStorageFactory, Peer};
use crate::error::KelipsError;

/// Cluster-wide peer view maintained by the membership layer.
///
/// Resolves addresses to peers carrying current proximity data. Addresses
/// unknown to the library are dropped from the result.
pub trait PeerLibrary: Send + Sync {
    fn get_by_address(&self, hosts: &[String]) -> Vec<Peer>;
}

/// Directory backed by a shared `PeerLibrary`.
///
/// Only the membership addresses of one group are stored here; the peers
/// themselves (and their rtt) are resolved through the library at selection
/// time, so routing always sees the freshest proximity data.
pub struct LibraryContacts {
    group_id: u64,
    local_host: String,
    contacts: DashSet<String>,
    library: Arc<dyn PeerLibrary>,
}

impl LibraryContacts {
    pub fn new(
        group_id: u64,
        local_host: impl Into<String>,
        library: Arc<dyn PeerLibrary>,
    ) -> Self {
        Self {
            group_id,
            local_host: local_host.into(),
            contacts: DashSet::new(),
            library,
        }
    }

    fn resolve(&self) -> Vec<Peer> {
        let addrs: Vec<String> = self.contacts.iter().map(|addr| addr.key().clone()).collect();
        self.library.get_by_address(&addrs)
    }
}

impl ContactStorage for LibraryContacts {
    fn add(&self, peer: Peer) -> Result<(), KelipsError> {
        if !self.contacts.insert(peer.host) {
            return Err(KelipsError::ContactExists);
        }
        tracing::debug!("group={} contacts={}", self.group_id, self.contacts.len());
        Ok(())
    }

    fn remove(&self, host: &str) -> Result<(), KelipsError> {
        self.contacts
            .remove(host)
            .map(|_| ())
            .ok_or(KelipsError::ContactNotFound)
    }

    fn list(&self) -> Vec<Peer> {
        self.resolve()
    }

    fn get_closest(&self) -> Option<Peer> {
        closest_of(self.resolve(), &self.local_host)
    }

    fn get_random(&self) -> Option<Peer> {
        random_of(self.resolve())
    }
}

/// Factory wiring every group's directory to one shared `PeerLibrary`.
pub struct LibraryContactsFactory {
    local_host: String,
    library: Arc<dyn PeerLibrary>,
}

impl LibraryContactsFactory {
    pub fn new(local_host: impl Into<String>, library: Arc<dyn PeerLibrary>) -> Self {
        Self {
            local_host: local_host.into(),
            library,
        }
    }
}

impl ContactStorageFactory for LibraryContactsFactory {
    fn new_directory(&self, group_id: u64, _home: bool) -> Arc<dyn ContactStorage> {
        Arc::new(LibraryContacts::new(
            group_id,
            self.local_host.clone(),
            self.library.clone(),
        ))
    }
}
