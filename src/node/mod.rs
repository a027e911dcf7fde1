//! Kelips Node
//!
//! Top-level composition: exactly K affinity groups (one home, K−1 remote),
//! the shared hash partitioner, and the wire transport. Public operations
//! are dispatched to the group the key or peer hashes into; groups proceed
//! in parallel and nothing is serialized across them.

pub mod config;

pub use config::KelipsConfig;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::contacts::{ContactStorageFactory, InmemContactsFactory, Peer};
use crate::error::KelipsError;
use crate::group::{AffinityGroup, GroupContact, HomeGroup, LookupRequest, RemoteGroup};
use crate::routing::Partitioner;
use crate::transport::Transport;

/// User-facing handle to one DHT node.
pub struct Kelips {
    home_id: u64,
    partitioner: Partitioner,
    groups: Vec<Arc<dyn AffinityGroup>>,
    transport: Arc<dyn Transport>,
}

impl Kelips {
    /// Builds a node advertising `host`. The home group is seeded with the
    /// local host as its first contact, so a lone node can already answer
    /// inserts for keys hashing into its own group.
    pub fn new(host: &str, mut conf: KelipsConfig) -> Result<Arc<Self>, KelipsError> {
        conf.validate()?;

        let transport = conf
            .transport
            .clone()
            .ok_or_else(|| KelipsError::InvalidConfig("a transport is required".to_string()))?;
        let tuples = conf
            .tuples
            .clone()
            .ok_or_else(|| KelipsError::InvalidConfig("a tuple store is required".to_string()))?;
        let contacts: Arc<dyn ContactStorageFactory> = match conf.contacts.clone() {
            Some(factory) => factory,
            None => Arc::new(InmemContactsFactory::new(host)),
        };

        let partitioner = Partitioner::new(conf.k, conf.hash_func.clone())?;
        let home_id = partitioner.group(host.as_bytes());

        let mut groups: Vec<Arc<dyn AffinityGroup>> = Vec::with_capacity(conf.k as usize);
        for id in 0..conf.k {
            let contact = GroupContact::new(id, host);
            if id == home_id {
                groups.push(HomeGroup::new(
                    contact,
                    contacts.new_directory(id, true),
                    tuples.clone(),
                    conf.tuple_ttl,
                    conf.tuple_expire_min,
                    conf.tuple_expire_max,
                    transport.clone(),
                ));
            } else {
                groups.push(RemoteGroup::new(
                    contact,
                    contacts.new_directory(id, false),
                    transport.clone(),
                ));
            }
        }

        groups[home_id as usize].add_peer(Peer::new(host))?;

        Ok(Arc::new(Self {
            home_id,
            partitioner,
            groups,
            transport,
        }))
    }

    /// Inserts a key into the DHT, returning the owning host. Errors are
    /// annotated with the affinity group the key hashed into.
    pub async fn insert(&self, key: &[u8]) -> Result<String, KelipsError> {
        let idx = self.partitioner.group(key);
        self.groups[idx as usize]
            .insert(key)
            .await
            .map_err(|e| KelipsError::Group {
                id: idx,
                source: Box::new(e),
            })
    }

    /// Resolves a key to the host believed to hold it.
    pub async fn lookup(&self, req: &LookupRequest) -> Result<String, KelipsError> {
        let idx = self.partitioner.group(&req.key);
        self.groups[idx as usize].lookup(req).await
    }

    /// Adds a peer as a contact of the group its address hashes into.
    /// Returns that group's index.
    pub fn add_peer(&self, peer: Peer) -> Result<u64, KelipsError> {
        let idx = self.partitioner.group(peer.host.as_bytes());
        self.groups[idx as usize].add_peer(peer)?;
        Ok(idx)
    }

    /// Removes a peer from the group its address hashes into.
    pub fn remove_peer(&self, host: &str) -> Result<u64, KelipsError> {
        let idx = self.partitioner.group(host.as_bytes());
        self.groups[idx as usize].remove_peer(host)?;
        Ok(idx)
    }

    /// Starts the transport on the listener, then every group's background
    /// tasks. Non-blocking.
    pub async fn start(&self, listener: TcpListener) -> Result<(), KelipsError> {
        self.transport.start(listener).await?;

        for group in &self.groups {
            group.start();
        }
        Ok(())
    }

    /// Gracefully shuts down the transport.
    pub async fn shutdown(&self, deadline: Duration) -> Result<(), KelipsError> {
        self.transport.shutdown(deadline).await
    }

    /// Index of this node's home group.
    pub fn home_id(&self) -> u64 {
        self.home_id
    }

    /// This node's contact for its home group.
    pub fn contact(&self) -> GroupContact {
        self.groups[self.home_id as usize].contact()
    }

    /// Number of affinity groups.
    pub fn k(&self) -> u64 {
        self.partitioner.k()
    }
}
