//! HTTP Transport Protocol
//!
//! Endpoints and headers of the reference HTTP binding.
//!
//! - `POST /kelips/<key>` inserts a key, `GET /kelips/<key>` looks one up.
//!   Both answer 200 with the owning host as plain text, or 400 with the
//!   error text.
//! - `POST /peer/<host:port>` adds a peer to the target group.
//! - The `Affinity-Group` header selects the group on the receiver; a
//!   missing or unparsable header is a 400, an unregistered group a 404.

use serde::{Deserialize, Serialize};

// --- Endpoints ---

/// Key insert/lookup endpoint; the key is the remainder of the path.
pub const ENDPOINT_KELIPS: &str = "/kelips";
/// Peer announcement endpoint.
pub const ENDPOINT_PEER: &str = "/peer";
/// Node observability endpoint.
pub const ENDPOINT_STATS: &str = "/health/stats";

// --- Headers ---

/// Target affinity group id on the receiving node.
pub const HEADER_GROUP: &str = "affinity-group";
/// Originating group contact, serialized as `<host>/<id>`.
pub const HEADER_ORIGINATOR: &str = "originator";
/// Remaining hop budget of a lookup.
pub const HEADER_TTL: &str = "kelips-ttl";

/// Hop budget applied when a request does not carry one.
pub const DEFAULT_TTL: u32 = 3;

/// Per-call deadline for outgoing requests, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 5;

/// Payload of `GET /health/stats`.
#[derive(Debug, Serialize, Deserialize)]
pub struct NodeStatsResponse {
    /// Local advertise address.
    pub host: String,
    /// Affinity groups registered with this transport.
    pub groups: Vec<u64>,
    pub cpu_usage: f32,
    pub mem_used_mb: u64,
    pub mem_total_mb: u64,
}
