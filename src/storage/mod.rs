//! Soft-State Tuple Store
//!
//! Holds the key → owning-host mappings for the node's home affinity group.
//! All state is in-memory soft state: tuples are refreshed by pings arriving
//! over gossip and removed once their TTL lapses without one.
//!
//! ## Core Concepts
//! - **First-insert-wins**: a duplicate insert never overwrites the owning
//!   host; replayed gossip frames are therefore idempotent.
//! - **Expiry**: a tuple is eligible for removal once `now - last_seen`
//!   exceeds the configured TTL; the home group sweeps on a jittered
//!   interval.
//! - **Host purge**: when a peer leaves, every tuple it owned is dropped in
//!   one pass (`expire_host`), letting a later insert re-establish the key.

pub mod memory;
pub mod types;

pub use memory::InmemTuples;
pub use types::{Tuple, TupleStorage};

#[cfg(test)]
mod tests;
