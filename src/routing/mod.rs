//! Affinity-Group Routing
//!
//! Maps keys and peer addresses to affinity groups. Peers and keys share the
//! same placement function, so every node can independently compute which
//! group any key or host belongs to.
//!
//! ## Mechanism
//! - **Hashing**: The configured digest (SHA-256 by default) is interpreted
//!   as an unsigned big-endian integer and reduced modulo `k`.
//! - **Determinism**: All nodes in a cluster must share the same hash
//!   function and `k`, otherwise their group assignments diverge.

pub mod partitioner;

pub use partitioner::{sha256_hash_func, HashFunc, Partitioner};
