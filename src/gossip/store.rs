use std::sync::Arc;
use std::time::Duration;

use super::protocol::encode_broadcast;
use super::GossipPool;
use crate::storage::{Tuple, TupleStorage};

/// Tuple store decorator that announces inserts to the group's gossip pool.
///
/// Broadcast failures never fail the insert; state exchange repairs any
/// member that missed the frame.
pub struct GossipTuples {
    inner: Arc<dyn TupleStorage>,
    pool: Arc<dyn GossipPool>,
}

impl GossipTuples {
    pub fn new(inner: Arc<dyn TupleStorage>, pool: Arc<dyn GossipPool>) -> Self {
        Self { inner, pool }
    }
}

impl TupleStorage for GossipTuples {
    fn insert(&self, tuples: Vec<Tuple>) -> usize {
        let added = self.inner.insert(tuples.clone());
        if tuples.is_empty() {
            return added;
        }

        match encode_broadcast(&self.pool.local_host(), &tuples) {
            Ok(frame) => {
                if let Err(e) = self.pool.broadcast(frame) {
                    tracing::error!("Failed to broadcast insert: {}", e);
                }
            }
            Err(e) => tracing::error!("Failed to encode insert frame: {}", e),
        }
        added
    }

    fn ping(&self, keys: &[Vec<u8>]) -> usize {
        self.inner.ping(keys)
    }

    fn lookup(&self, key: &[u8]) -> Option<Tuple> {
        self.inner.lookup(key)
    }

    fn list(&self) -> Vec<Tuple> {
        self.inner.list()
    }

    fn delete(&self, keys: &[Vec<u8>]) -> usize {
        self.inner.delete(keys)
    }

    fn expire(&self, ttl: Duration) -> usize {
        self.inner.expire(ttl)
    }

    fn expire_host(&self, host: &str) -> usize {
        self.inner.expire_host(host)
    }
}
