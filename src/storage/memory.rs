use std::time::{Duration, Instant};

use dashmap::DashMap;

use super::types::{Tuple, TupleStorage};

/// In-memory `TupleStorage` over a sharded concurrent map.
#[derive(Default)]
pub struct InmemTuples {
    tuples: DashMap<Vec<u8>, Tuple>,
}

impl InmemTuples {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TupleStorage for InmemTuples {
    fn insert(&self, tuples: Vec<Tuple>) -> usize {
        let mut added = 0;
        for mut tuple in tuples {
            if let dashmap::mapref::entry::Entry::Vacant(slot) =
                self.tuples.entry(tuple.key.clone())
            {
                tuple.heartbeats = 0;
                tuple.last_seen = Instant::now();
                slot.insert(tuple);
                added += 1;
            }
        }
        added
    }

    fn ping(&self, keys: &[Vec<u8>]) -> usize {
        let mut updated = 0;
        for key in keys {
            if let Some(mut tuple) = self.tuples.get_mut(key) {
                tuple.ping();
                updated += 1;
            }
        }
        updated
    }

    fn lookup(&self, key: &[u8]) -> Option<Tuple> {
        self.tuples.get(key).map(|tuple| tuple.clone())
    }

    fn list(&self) -> Vec<Tuple> {
        self.tuples.iter().map(|entry| entry.value().clone()).collect()
    }

    fn delete(&self, keys: &[Vec<u8>]) -> usize {
        let mut removed = 0;
        for key in keys {
            if self.tuples.remove(key).is_some() {
                removed += 1;
            }
        }
        removed
    }

    fn expire(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.tuples.retain(|_, tuple| {
            if now.duration_since(tuple.last_seen) > ttl {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    fn expire_host(&self, host: &str) -> usize {
        let mut removed = 0;
        self.tuples.retain(|_, tuple| {
            if tuple.host == host {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}
