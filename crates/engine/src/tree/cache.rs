//! Snapshot cache and freshness control
//!
//! The cache holds at most one published [`Snapshot`]. A lookup first
//! checks freshness: no snapshot, a forced invalidation, or an elapsed
//! rescan interval triggers a synchronous rebuild before resolving.
//! Snapshots are immutable once published; invalidation replaces the whole
//! snapshot, so a lookup never observes a tree under construction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use connector::Connector;
use parking_lot::RwLock;
use tracing::debug;

use super::build::build_root;
use crate::error::FsError;
use crate::node::{Directory, FileNode, FileStat, Node};
use crate::policy::RescanPolicy;

/// Shared freshness controls: the live rescan policy and the forced
/// rebuild flag flipped by an unparsable write to the `rescan` file.
#[derive(Debug)]
pub struct CacheControl {
    policy: RwLock<RescanPolicy>,
    force_rebuild: AtomicBool,
}

impl CacheControl {
    pub fn new(policy: RescanPolicy) -> Self {
        Self {
            policy: RwLock::new(policy),
            force_rebuild: AtomicBool::new(false),
        }
    }

    pub fn policy(&self) -> RescanPolicy {
        *self.policy.read()
    }

    /// Install a new policy, effective at the next freshness check.
    pub fn set_policy(&self, policy: RescanPolicy) {
        debug!(policy = %policy, "rescan policy updated");
        *self.policy.write() = policy;
    }

    /// Make the next access treat the cache as empty.
    pub fn request_rebuild(&self) {
        debug!("rebuild requested");
        self.force_rebuild.store(true, Ordering::SeqCst);
    }

    fn take_rebuild_request(&self) -> bool {
        self.force_rebuild.swap(false, Ordering::SeqCst)
    }
}

/// The control file at `/rescan`.
///
/// Reading returns the current policy as `"<N><unit>\n"`. Writing a valid
/// interval installs it; writing anything else forces a full rebuild on
/// the next access.
#[derive(Debug)]
pub struct RescanFile {
    control: Arc<CacheControl>,
}

impl RescanFile {
    pub fn new(control: Arc<CacheControl>) -> Self {
        Self { control }
    }
}

#[async_trait]
impl FileNode for RescanFile {
    fn name(&self) -> &str {
        "rescan"
    }

    fn mode(&self) -> u32 {
        0o660
    }

    async fn read(&self) -> Result<String, FsError> {
        Ok(format!("{}\n", self.control.policy()))
    }

    async fn write(&self, input: &str) -> Result<(), FsError> {
        match input.parse::<RescanPolicy>() {
            Ok(policy) => self.control.set_policy(policy),
            Err(_) => self.control.request_rebuild(),
        }
        Ok(())
    }
}

/// An immutable materialized tree plus its build timestamp.
#[derive(Debug)]
pub struct Snapshot {
    root: Arc<Directory>,
    built_at: Instant,
}

impl Snapshot {
    pub fn root(&self) -> &Arc<Directory> {
        &self.root
    }

    pub fn built_at(&self) -> Instant {
        self.built_at
    }

    /// Resolve a path against this snapshot. The empty path (or `/`) is
    /// the root; otherwise each `/`-separated segment indexes the child
    /// map of the directory walked so far.
    pub fn resolve(&self, path: &str) -> Result<Node, FsError> {
        let mut node = Node::Dir(self.root.clone());
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            let Node::Dir(dir) = node else {
                return Err(FsError::NotFound(path.to_string()));
            };
            node = dir
                .get(segment)
                .ok_or_else(|| FsError::NotFound(path.to_string()))?;
        }
        Ok(node)
    }
}

/// The cache object owned by a mount session.
///
/// All request handlers share one `TreeCache` by handle; there is no
/// process-wide tree state, so independent mounts coexist and tests never
/// need a global reset.
#[derive(Debug)]
pub struct TreeCache {
    connector: Arc<dyn Connector>,
    control: Arc<CacheControl>,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl TreeCache {
    pub fn new(connector: Arc<dyn Connector>, policy: RescanPolicy) -> Self {
        Self {
            connector,
            control: Arc::new(CacheControl::new(policy)),
            snapshot: RwLock::new(None),
        }
    }

    /// Freshness controls, shared with the in-tree `rescan` file.
    pub fn control(&self) -> &Arc<CacheControl> {
        &self.control
    }

    /// The current snapshot, rebuilding first if the cache is empty,
    /// expired, or force-invalidated. The new tree is built completely and
    /// then published by replacing the snapshot slot.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        let forced = self.control.take_rebuild_request();
        if !forced {
            let existing = self.snapshot.read().clone();
            if let Some(snapshot) = existing {
                // An interval too large to add to the build instant never
                // expires.
                let expires_at = snapshot
                    .built_at
                    .checked_add(self.control.policy().as_duration());
                match expires_at {
                    None => return snapshot,
                    Some(expires_at) if Instant::now() < expires_at => return snapshot,
                    Some(_) => debug!("snapshot expired"),
                }
            }
        }

        let root = build_root(&self.connector, &self.control).await;
        let snapshot = Arc::new(Snapshot {
            root,
            built_at: Instant::now(),
        });
        *self.snapshot.write() = Some(snapshot.clone());
        snapshot
    }

    /// Resolve a path against the freshest snapshot.
    pub async fn resolve(&self, path: &str) -> Result<Node, FsError> {
        self.snapshot().await.resolve(path)
    }

    // Dispatch facade for the host filesystem binding.

    pub async fn stat(&self, path: &str) -> Result<FileStat, FsError> {
        self.resolve(path).await?.stat().await
    }

    /// Entry names of a directory, `.`/`..` stubs included.
    pub async fn read_dir(&self, path: &str) -> Result<Vec<String>, FsError> {
        match self.resolve(path).await? {
            Node::Dir(dir) => Ok(dir.entry_names()),
            Node::File(_) => Err(FsError::NotSupported("list")),
        }
    }

    pub async fn read(&self, path: &str) -> Result<String, FsError> {
        self.resolve(path).await?.read().await
    }

    pub async fn write(&self, path: &str, input: &str) -> Result<(), FsError> {
        self.resolve(path).await?.write(input).await
    }
}
