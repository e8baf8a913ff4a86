//! Tree builder and snapshot cache
//!
//! Owns the current materialized snapshot of the node tree, decides when to
//! rebuild it from the connector, and resolves request paths against it.

mod build;
mod cache;

pub use cache::{CacheControl, RescanFile, Snapshot, TreeCache};
