use std::time::{Duration, Instant};

/// A key to owning-host mapping along with its liveness counters.
#[derive(Debug, Clone)]
pub struct Tuple {
    /// Tuple key. Immutable after insert.
    pub key: Vec<u8>,
    /// Host on which the data associated with the key lives.
    pub host: String,
    /// Count of pings received for this tuple. Observability only.
    pub heartbeats: u64,
    /// Monotonic timestamp of the last insert or ping.
    pub last_seen: Instant,
}

impl Tuple {
    pub fn new(key: Vec<u8>, host: impl Into<String>) -> Self {
        Self {
            key,
            host: host.into(),
            heartbeats: 0,
            last_seen: Instant::now(),
        }
    }

    pub(crate) fn ping(&mut self) {
        self.heartbeats += 1;
        self.last_seen = Instant::now();
    }
}

/// Storage contract for the home group's tuple slice.
///
/// No operation fails; callers interpret the returned counts. All
/// operations are safe under concurrent readers and writers and no caller
/// may observe a half-mutated tuple.
pub trait TupleStorage: Send + Sync {
    /// Stores each tuple whose key is absent with a fresh `last_seen` and
    /// zeroed heartbeats; present keys are skipped. Returns the number of
    /// tuples newly inserted.
    fn insert(&self, tuples: Vec<Tuple>) -> usize;

    /// Increments heartbeats and refreshes `last_seen` for each present
    /// key. Returns the number of tuples updated.
    fn ping(&self, keys: &[Vec<u8>]) -> usize;

    /// Returns a deep copy of the stored tuple, or `None` if absent.
    fn lookup(&self, key: &[u8]) -> Option<Tuple>;

    /// Deep copies of all tuples; ordering unspecified.
    fn list(&self) -> Vec<Tuple>;

    /// Removes the given keys. Returns the number removed.
    fn delete(&self, keys: &[Vec<u8>]) -> usize;

    /// Removes all tuples not seen within `ttl`. Returns the number removed.
    fn expire(&self, ttl: Duration) -> usize;

    /// Removes all tuples owned by `host`. Returns the number removed.
    fn expire_host(&self, host: &str) -> usize;
}
