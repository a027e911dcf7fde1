use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::types::{GroupContact, LookupRequest};
use super::AffinityGroup;
use crate::contacts::{ContactStorage, Peer};
use crate::error::KelipsError;
use crate::storage::{Tuple, TupleStorage};
use crate::transport::Transport;

/// The affinity group this node belongs to.
///
/// Owns the node's tuple-store slice and the expiry sweep. Lookups are
/// answered from local state first; only on a miss does the request burn a
/// hop towards the closest group member.
pub struct HomeGroup {
    contact: GroupContact,
    contacts: Arc<dyn ContactStorage>,
    tuples: Arc<dyn TupleStorage>,
    tuple_ttl: Duration,
    expire_min: Duration,
    expire_max: Duration,
    transport: Arc<dyn Transport>,
}

impl HomeGroup {
    pub fn new(
        contact: GroupContact,
        contacts: Arc<dyn ContactStorage>,
        tuples: Arc<dyn TupleStorage>,
        tuple_ttl: Duration,
        expire_min: Duration,
        expire_max: Duration,
        transport: Arc<dyn Transport>,
    ) -> Arc<Self> {
        let group = Arc::new(Self {
            contact: contact.clone(),
            contacts,
            tuples,
            tuple_ttl,
            expire_min,
            expire_max,
            transport,
        });
        group
            .transport
            .register(contact, group.clone() as Arc<dyn AffinityGroup>);
        group
    }
}

#[async_trait]
impl AffinityGroup for HomeGroup {
    fn is_local(&self) -> bool {
        true
    }

    fn contact(&self) -> GroupContact {
        self.contact.clone()
    }

    async fn insert(&self, key: &[u8]) -> Result<String, KelipsError> {
        // Any group member (including this node) can be the owning host.
        let peer = self.contacts.get_random().ok_or(KelipsError::NoContacts)?;
        self.tuples
            .insert(vec![Tuple::new(key.to_vec(), peer.host.clone())]);
        Ok(peer.host)
    }

    async fn lookup(&self, req: &LookupRequest) -> Result<String, KelipsError> {
        // Local state first.
        if let Some(tuple) = self.tuples.lookup(&req.key) {
            return Ok(tuple.host);
        }

        // Hop budget is checked before trying another group member.
        if req.ttl == 0 {
            return Err(KelipsError::TtlExhausted);
        }

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
            ttl: req.ttl - 1,
            originator: self.contact.clone(),
        };
        let target = GroupContact::new(self.contact.id, peer.host);
        self.transport.lookup(&target, &next).await
    }

    fn add_peer(&self, peer: Peer) -> Result<(), KelipsError> {
        self.contacts.add(peer)
    }

    fn remove_peer(&self, host: &str) -> Result<(), KelipsError> {
        self.contacts.remove(host)
    }

    /// Spawns the expiry sweep. The interval is drawn uniformly from
    /// `[expire_min, expire_max]` on every pass so sweeps across a cluster
    /// do not synchronise. Runs until the process exits.
    fn start(&self) {
        tracing::info!(
            "Tuple expiration group={} min={:?} max={:?}",
            self.contact.id,
            self.expire_min,
            self.expire_max
        );

        let tuples = self.tuples.clone();
        let group_id = self.contact.id;
        let (min, max, ttl) = (self.expire_min, self.expire_max, self.tuple_ttl);
        tokio::spawn(async move {
            loop {
                let sleep_for = rand::thread_rng().gen_range(min..=max);
                tokio::time::sleep(sleep_for).await;

                let expired = tuples.expire(ttl);
                if expired > 0 {
                    tracing::info!("Expired group={} tuples={}", group_id, expired);
                }
            }
        });
    }
}
