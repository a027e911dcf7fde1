//! Error kinds surfaced by the DHT core.
//!
//! Background tasks (expiry, gossip delegates) never propagate these upward;
//! they log and continue. Everything else flows to the caller through
//! `Result`, with the dispatcher adding the affinity-group index on inserts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KelipsError {
    /// No peer available in the required contact directory. Recoverable
    /// once membership refreshes the directory.
    #[error("no contacts")]
    NoContacts,

    /// A local lookup missed and the hop budget is zero.
    #[error("request TTL reached")]
    TtlExhausted,

    /// The peer is already present in the directory. Membership deltas
    /// treat this as an idempotent join.
    #[error("contact exists")]
    ContactExists,

    #[error("contact not found")]
    ContactNotFound,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Parse failure in a broadcast or state-exchange frame. Logged and
    /// dropped at the gossip boundary, never fatal.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Any failure from the wire transport (timeout, connection refused,
    /// non-200 status). The remote error text is carried verbatim.
    #[error("transport: {0}")]
    Transport(String),

    /// A group-level failure annotated with the affinity-group index.
    #[error("group {id}: {source}")]
    Group {
        id: u64,
        #[source]
        source: Box<KelipsError>,
    },
}
