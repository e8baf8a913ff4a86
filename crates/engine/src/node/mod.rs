//! Typed filesystem entities
//!
//! Every entry in the synthetic tree is a [`Node`]: either a [`Directory`]
//! with a child map, or a file implementing the [`FileNode`] capability
//! trait. The trait carries default `NotSupported` answers so a node kind
//! only opts into the operations it actually supports; the host binding
//! never probes for capabilities.

mod attribute;
mod file;
mod operation;

pub use attribute::AttributeFile;
pub use file::{DynamicFile, LogFile, StaticFile};
pub use operation::{build_operation_dir, InvokeFile};

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::FsError;

/// Permission bits for directories: traverse + read for owner/group.
pub const DIR_MODE: u32 = 0o550;

/// Default permission bits for read-only files.
pub const RO_FILE_MODE: u32 = 0o440;

/// Kind tag of a node, as reported by `stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

/// Stat answer for a node: kind, permission bits, and size in bytes.
///
/// Size is recomputed on every call for computed-on-read files, so a stat
/// is always consistent with the read that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub kind: NodeKind,
    pub mode: u32,
    pub size: u64,
}

/// Capability contract for file nodes.
///
/// `read`, `write`, and `size` default to [`FsError::NotSupported`] /
/// read-derived answers; implementations override only what they support.
#[async_trait]
pub trait FileNode: Send + Sync + std::fmt::Debug {
    /// Path segment name of this file.
    fn name(&self) -> &str;

    /// Permission bits.
    fn mode(&self) -> u32;

    /// Size in bytes. Defaults to the byte length of a fresh read.
    async fn size(&self) -> Result<u64, FsError> {
        Ok(self.read().await?.len() as u64)
    }

    /// Full textual content of the file.
    async fn read(&self) -> Result<String, FsError> {
        Err(FsError::NotSupported("read"))
    }

    /// Replace/interpret the file content with `input`.
    async fn write(&self, _input: &str) -> Result<(), FsError> {
        Err(FsError::NotSupported("write"))
    }
}

/// A node in the synthetic tree.
#[derive(Debug, Clone)]
pub enum Node {
    Dir(Arc<Directory>),
    File(Arc<dyn FileNode>),
}

impl Node {
    /// Path segment name of this node.
    pub fn name(&self) -> String {
        match self {
            Node::Dir(dir) => dir.name().to_string(),
            Node::File(file) => file.name().to_string(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Dir(_) => NodeKind::Directory,
            Node::File(_) => NodeKind::File,
        }
    }

    /// Stat this node. File sizes are recomputed, never trusted from a
    /// previous call.
    pub async fn stat(&self) -> Result<FileStat, FsError> {
        match self {
            Node::Dir(_) => Ok(FileStat {
                kind: NodeKind::Directory,
                mode: DIR_MODE,
                size: 0,
            }),
            Node::File(file) => Ok(FileStat {
                kind: NodeKind::File,
                mode: file.mode(),
                size: file.size().await?,
            }),
        }
    }

    /// Read file content; directories refuse.
    pub async fn read(&self) -> Result<String, FsError> {
        match self {
            Node::Dir(_) => Err(FsError::NotSupported("read")),
            Node::File(file) => file.read().await,
        }
    }

    /// Write file content; directories refuse.
    pub async fn write(&self, input: &str) -> Result<(), FsError> {
        match self {
            Node::Dir(_) => Err(FsError::NotSupported("write")),
            Node::File(file) => file.write(input).await,
        }
    }
}

/// A directory with an ordered child map.
///
/// Child names are unique within a parent. Every non-stub directory
/// carries `.` and `..` stub entries: leaf-only stand-ins with no children
/// of their own, present so listings look like a real filesystem.
#[derive(Debug)]
pub struct Directory {
    name: String,
    children: RwLock<BTreeMap<String, Node>>,
}

impl Directory {
    /// Create a directory with the `.`/`..` stubs pre-registered.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        let dir = Arc::new(Self {
            name: name.into(),
            children: RwLock::new(BTreeMap::new()),
        });
        {
            let mut children = dir.children.write();
            children.insert(".".to_string(), Node::Dir(Self::stub(".")));
            children.insert("..".to_string(), Node::Dir(Self::stub("..")));
        }
        dir
    }

    /// Create the tree root (empty name).
    pub fn root() -> Arc<Self> {
        Self::new("")
    }

    /// A leaf-only stand-in directory; never gains children.
    fn stub(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            children: RwLock::new(BTreeMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get or create a child directory. Idempotent: an existing directory
    /// child with this name is returned as-is. A file child occupying the
    /// name is replaced, which only happens when decoded bean segments
    /// collide with a synthesized file name.
    pub fn add_directory(&self, name: &str) -> Arc<Directory> {
        let mut children = self.children.write();
        if let Some(Node::Dir(existing)) = children.get(name) {
            debug!(name, "child directory already exists");
            return existing.clone();
        }
        if children.contains_key(name) {
            warn!(name, "replacing file entry with a directory");
        }
        let dir = Directory::new(name);
        children.insert(name.to_string(), Node::Dir(dir.clone()));
        dir
    }

    /// Attach a child node under its own name, replacing any previous
    /// entry with that name.
    pub fn add_child(&self, node: Node) {
        let name = node.name();
        let mut children = self.children.write();
        if children.insert(name.clone(), node).is_some() {
            warn!(name = %name, "replacing existing child entry");
        }
    }

    /// Look up a direct child by name.
    pub fn get(&self, name: &str) -> Option<Node> {
        self.children.read().get(name).cloned()
    }

    /// Names of all entries, including the `.`/`..` stubs, in map order.
    pub fn entry_names(&self) -> Vec<String> {
        self.children.read().keys().cloned().collect()
    }

    /// Number of entries excluding the stubs.
    pub fn len(&self) -> usize {
        let children = self.children.read();
        children.keys().filter(|k| *k != "." && *k != "..").count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
