//! Wire Transport
//!
//! The routing core never talks to the network directly; it drives a
//! [`Transport`] with four verbs (insert, lookup, add-peer, plus lifecycle).
//! Incoming RPCs flow the other way: the transport holds a registry of
//! affinity groups, populated through `register` during node construction,
//! and dispatches each request to the group named by the caller. This keeps
//! the node → transport → group cycle to a map of shared handles whose
//! lifetime is bounded by the node.
//!
//! The reference binding speaks HTTP: an axum server for the incoming side
//! and a reqwest client (5 s per-call timeout) for the outgoing side.

pub mod handlers;
pub mod http;
pub mod protocol;

pub use http::HttpTransport;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use crate::contacts::Peer;
use crate::error::KelipsError;
use crate::group::{AffinityGroup, GroupContact, LookupRequest};

/// Network transport consumed by the routing core.
///
/// Errors surface to the caller verbatim as [`KelipsError::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Inserts a key at a remote group, returning the owning host.
    async fn insert(&self, target: &GroupContact, key: &[u8]) -> Result<String, KelipsError>;

    /// Resolves a key through a remote group, returning the owning host.
    async fn lookup(
        &self,
        target: &GroupContact,
        req: &LookupRequest,
    ) -> Result<String, KelipsError>;

    /// Asks a remote group member to add a peer to its directory.
    async fn add_peer(&self, target: &GroupContact, peer: &Peer) -> Result<(), KelipsError>;

    /// Registers an affinity group so incoming RPCs can reach it.
    fn register(&self, contact: GroupContact, group: Arc<dyn AffinityGroup>);

    /// Starts serving on the listener. Non-blocking.
    async fn start(&self, listener: TcpListener) -> Result<(), KelipsError>;

    /// Gracefully shuts the transport down, waiting at most `deadline`.
    async fn shutdown(&self, deadline: Duration) -> Result<(), KelipsError>;
}
