//! Affinity Groups
//!
//! A Kelips node views the cluster as K affinity groups and keeps one state
//! machine per group. The group this node hashes into is its **home** group:
//! it owns the node's tuple-store slice, answers lookups from local state
//! and runs the background expiry sweep. Every other group is **remote**: a
//! pure routing shim holding contacts into that group.
//!
//! The dispatcher never needs to know which variant it is talking to; both
//! implement [`AffinityGroup`].

pub mod home;
pub mod remote;
pub mod types;

pub use home::HomeGroup;
pub use remote::RemoteGroup;
pub use types::{GroupContact, LookupRequest};

use async_trait::async_trait;

use crate::contacts::Peer;
use crate::error::KelipsError;

/// Per-group behavior shared by the home and remote variants.
#[async_trait]
pub trait AffinityGroup: Send + Sync {
    /// True if this node belongs to the group.
    fn is_local(&self) -> bool;

    /// This node's contact information for the group.
    fn contact(&self) -> GroupContact;

    /// Inserts a key into the group, returning the owning host.
    async fn insert(&self, key: &[u8]) -> Result<String, KelipsError>;

    /// Resolves a key to its owning host, forwarding when necessary.
    async fn lookup(&self, req: &LookupRequest) -> Result<String, KelipsError>;

    /// Adds a peer to the group's contact directory.
    fn add_peer(&self, peer: Peer) -> Result<(), KelipsError>;

    /// Removes a peer from the group's contact directory.
    fn remove_peer(&self, host: &str) -> Result<(), KelipsError>;

    /// Starts the group's background tasks, if any.
    fn start(&self);
}

#[cfg(test)]
mod tests;
