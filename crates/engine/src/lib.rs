//! beanfs exposes a remote MBean hierarchy as a synthetic file tree.
//!
//! Directories mirror the bean namespace, attribute values appear as
//! readable/writable files, and operations are invoked by writing argument
//! strings to an `invoke` file and reading result lines back from a
//! per-operation `results` log.
//!
//! # Architecture
//!
//! - [`TreeCache`]: owns the current [`Snapshot`] of the tree, rebuilds it
//!   from a [`connector::Connector`] when empty/expired/invalidated, and
//!   resolves paths against it
//! - [`Node`]: typed filesystem entities (directories, static/dynamic
//!   files, attribute files, operation directories) exposing
//!   stat/list/read/write contracts
//! - [`RescanPolicy`]: how long a snapshot stays fresh, editable at runtime
//!   through the in-tree `rescan` control file
//!
//! The host filesystem binding (FUSE or otherwise) dispatches its calls
//! into a `TreeCache` it owns; this crate performs no mounting itself.

pub mod invoke;
pub mod node;
pub mod policy;
pub mod tree;

mod error;
#[cfg(test)]
pub(crate) mod testing;

pub use error::FsError;
pub use node::{FileNode, FileStat, Node, NodeKind};
pub use policy::{ParsePolicyError, RescanPolicy, RescanUnit};
pub use tree::{CacheControl, Snapshot, TreeCache};
