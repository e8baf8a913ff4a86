//! Plain file nodes: static content, computed-on-read content, and
//! append-only logs.

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{FileNode, RO_FILE_MODE};
use crate::error::FsError;

/// A file whose content is fixed at construction.
///
/// Content is stored newline-terminated so the reported size always equals
/// what a full read returns.
#[derive(Debug)]
pub struct StaticFile {
    name: String,
    mode: u32,
    content: String,
}

impl StaticFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let mut content = content.into();
        if !content.ends_with('\n') {
            content.push('\n');
        }
        Self {
            name: name.into(),
            mode: RO_FILE_MODE,
            content,
        }
    }
}

#[async_trait]
impl FileNode for StaticFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> u32 {
        self.mode
    }

    async fn size(&self) -> Result<u64, FsError> {
        Ok(self.content.len() as u64)
    }

    async fn read(&self) -> Result<String, FsError> {
        Ok(self.content.clone())
    }
}

/// A file whose content is computed by a callback on every read.
///
/// No size is ever cached; stat recomputes it from fresh content so the
/// answer cannot go stale between stat and read.
pub struct DynamicFile {
    name: String,
    mode: u32,
    render: Box<dyn Fn() -> String + Send + Sync>,
}

impl DynamicFile {
    pub fn new(
        name: impl Into<String>,
        render: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            mode: RO_FILE_MODE,
            render: Box::new(render),
        }
    }
}

impl std::fmt::Debug for DynamicFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicFile")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish()
    }
}

#[async_trait]
impl FileNode for DynamicFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> u32 {
        self.mode
    }

    async fn read(&self) -> Result<String, FsError> {
        Ok((self.render)())
    }
}

/// An append-only log file, used for per-operation `results` and `error`
/// histories. Writes through the filesystem are refused; only the engine
/// appends.
#[derive(Debug, Default)]
pub struct LogFile {
    name: String,
    buf: RwLock<String>,
}

impl LogFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            buf: RwLock::new(String::new()),
        }
    }

    /// Append a line (already newline-terminated) to the log.
    pub fn append(&self, line: &str) {
        self.buf.write().push_str(line);
    }

    /// Number of lines currently held.
    pub fn line_count(&self) -> usize {
        self.buf.read().lines().count()
    }
}

#[async_trait]
impl FileNode for LogFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> u32 {
        RO_FILE_MODE
    }

    async fn read(&self) -> Result<String, FsError> {
        Ok(self.buf.read().clone())
    }
}
