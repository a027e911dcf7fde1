//! Kelips DHT Library
//!
//! A constant-hop distributed hash table based on the Kelips routing
//! scheme. Nodes self-organize into K affinity groups; within a group every
//! member carries soft-state tuples mapping keys to their owning host, so
//! any member answers a lookup for its group without further hops. A lookup
//! for a foreign group costs one extra hop through a contact maintained for
//! that group.
//!
//! ## Architecture Modules
//! The crate is composed of loosely coupled subsystems:
//!
//! - **`routing`**: The deterministic hash partitioner shared by key and
//!   peer placement.
//! - **`storage`**: The concurrent soft-state tuple store with TTL-based
//!   expiry and host-scoped purge.
//! - **`contacts`**: Per-group peer directories with closest/random
//!   selection, in-memory or backed by a shared peer library.
//! - **`group`**: The per-group state machines: the home variant owning
//!   the tuple slice and expiry sweep, the remote variant routing into
//!   foreign groups.
//! - **`node`**: The top-level dispatcher holding exactly K groups and the
//!   node configuration.
//! - **`gossip`**: The membrane to an external gossip substrate: tuple
//!   wire codec, broadcast-on-insert store decorator, and the delegates
//!   fed by membership and anti-entropy events.
//! - **`transport`**: The wire contract consumed by the core plus the
//!   reference HTTP binding.

pub mod contacts;
pub mod error;
pub mod gossip;
pub mod group;
pub mod node;
pub mod routing;
pub mod storage;
pub mod transport;

pub use contacts::Peer;
pub use error::KelipsError;
pub use group::{GroupContact, LookupRequest};
pub use node::{Kelips, KelipsConfig};
pub use storage::Tuple;
pub use transport::{HttpTransport, Transport};
