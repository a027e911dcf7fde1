//! Contact Directories
//!
//! Each affinity group on a node has a directory of peers known to belong to
//! that group. Directories drive routing: `get_closest` picks the forwarding
//! target for cross-node hops, `get_random` picks the owning host on insert.
//!
//! Two implementations exist, selected through `ContactStorageFactory`:
//! - **`InmemContacts`**: self-contained, per-directory peer set.
//! - **`LibraryContacts`**: stores only addresses and resolves peers (with
//!   proximity data) through a shared `PeerLibrary` maintained by the
//!   membership layer.

pub mod library;
pub mod memory;
pub mod types;

pub use library::{LibraryContacts, LibraryContactsFactory, PeerLibrary};
pub use memory::{InmemContacts, InmemContactsFactory};
pub use types::{ContactStorage, ContactStorageFactory, Peer};
