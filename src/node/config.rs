use std::sync::Arc;
use std::time::Duration;

use crate::contacts::ContactStorageFactory;
use crate::error::KelipsError;
use crate::routing::{sha256_hash_func, HashFunc};
use crate::storage::{InmemTuples, TupleStorage};
use crate::transport::Transport;

/// Configuration for a Kelips node.
///
/// `k` and `hash_func` must be identical on every node of a cluster; the
/// rest is local tuning. No environment variables, no persisted state.
pub struct KelipsConfig {
    /// Number of affinity groups. Required, must be greater than zero.
    pub k: u64,
    /// Hash used for key and peer placement. SHA-256 by default.
    pub hash_func: HashFunc,
    /// How long a tuple survives without a ping.
    pub tuple_ttl: Duration,
    /// Lower bound of the jittered expiry sweep interval.
    pub tuple_expire_min: Duration,
    /// Upper bound of the jittered expiry sweep interval.
    pub tuple_expire_max: Duration,
    /// Wire transport. Required.
    pub transport: Option<Arc<dyn Transport>>,
    /// Tuple store for the home group; in-memory when unset.
    pub tuples: Option<Arc<dyn TupleStorage>>,
    /// Per-group contact directory factory; in-memory when unset.
    pub contacts: Option<Arc<dyn ContactStorageFactory>>,
}

impl KelipsConfig {
    pub fn new(k: u64) -> Self {
        Self {
            k,
            hash_func: sha256_hash_func(),
            tuple_ttl: Duration::from_secs(45),
            tuple_expire_min: Duration::from_secs(20),
            tuple_expire_max: Duration::from_secs(30),
            transport: None,
            tuples: None,
            contacts: None,
        }
    }

    /// Checks invariants and fills in the defaults that do not depend on
    /// the local host.
    pub fn validate(&mut self) -> Result<(), KelipsError> {
        if self.k == 0 {
            return Err(KelipsError::InvalidConfig(
                "affinity group count must be greater than zero".to_string(),
            ));
        }
        if self.tuple_expire_min >= self.tuple_expire_max {
            return Err(KelipsError::InvalidConfig(
                "tuple expire interval min must be below max".to_string(),
            ));
        }
        if self.tuple_ttl < self.tuple_expire_max {
            return Err(KelipsError::InvalidConfig(
                "tuple TTL must be at least the expire interval max".to_string(),
            ));
        }
        if self.transport.is_none() {
            return Err(KelipsError::InvalidConfig(
                "a transport is required".to_string(),
            ));
        }
        if self.tuples.is_none() {
            self.tuples = Some(Arc::new(InmemTuples::new()));
        }
        Ok(())
    }
}
