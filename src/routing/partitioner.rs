use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::KelipsError;

/// Pluggable digest used for group placement. Must be identical on every
/// node of the cluster.
pub type HashFunc = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// Default hash function: SHA-256.
pub fn sha256_hash_func() -> HashFunc {
    Arc::new(|data| Sha256::digest(data).to_vec())
}

/// Maps keys and host addresses to one of `k` affinity groups.
#[derive(Clone)]
pub struct Partitioner {
    k: u64,
    hash: HashFunc,
}

impl Partitioner {
    pub fn new(k: u64, hash: HashFunc) -> Result<Self, KelipsError> {
        if k == 0 {
            return Err(KelipsError::InvalidConfig(
                "affinity group count must be greater than zero".to_string(),
            ));
        }
        Ok(Self { k, hash })
    }

    pub fn k(&self) -> u64 {
        self.k
    }

    /// Returns the affinity group id for a key (or a host address).
    ///
    /// The digest is reduced byte-wise, which is equivalent to interpreting
    /// the full digest as a big-endian unsigned integer modulo `k`.
    pub fn group(&self, key: &[u8]) -> u64 {
        let digest = (self.hash)(key);
        let k = self.k as u128;
        digest
            .iter()
            .fold(0u128, |rem, &byte| (rem * 256 + byte as u128) % k) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_is_deterministic() {
        let p = Partitioner::new(3, sha256_hash_func()).unwrap();
        assert_eq!(p.group(b"book_100"), p.group(b"book_100"));
    }

    #[test]
    fn group_matches_full_digest_modulo() {
        // Pinned against SHA-256 reduced with arbitrary-precision integers.
        let p = Partitioner::new(3, sha256_hash_func()).unwrap();
        assert_eq!(p.group(b"foo"), 2);
        assert_eq!(p.group(b"bar"), 0);
        assert_eq!(p.group(b"foobar"), 1);
    }

    #[test]
    fn group_is_within_range() {
        let p = Partitioner::new(7, sha256_hash_func()).unwrap();
        for i in 0..1000 {
            let key = format!("test_key_{}", i);
            assert!(p.group(key.as_bytes()) < 7);
        }
    }

    #[test]
    fn groups_are_all_reachable() {
        let p = Partitioner::new(8, sha256_hash_func()).unwrap();
        let mut seen = std::collections::HashSet::new();
        for i in 0..1000 {
            let key = format!("key_{}", i);
            seen.insert(p.group(key.as_bytes()));
        }
        assert_eq!(seen.len(), 8, "1000 keys should cover all 8 groups");
    }

    #[test]
    fn zero_groups_is_rejected() {
        assert!(matches!(
            Partitioner::new(0, sha256_hash_func()),
            Err(KelipsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn peers_and_keys_share_placement() {
        let p = Partitioner::new(3, sha256_hash_func()).unwrap();
        let host = "127.0.0.1:9000";
        assert_eq!(p.group(host.as_bytes()), p.group(host.as_bytes()));
    }
}
