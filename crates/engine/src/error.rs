//! Engine error taxonomy
//!
//! Everything a filesystem host can get back from the engine. The host
//! binding maps these onto its native signals: `NotFound` → "no such
//! entry", `NotSupported` → "operation not supported", the rest → "I/O
//! error".

use connector::ConnectorError;

/// Errors surfaced by path resolution and node operations.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The path does not resolve to any node in the current snapshot.
    #[error("no such entry: {0}")]
    NotFound(String),

    /// The node kind does not support the requested operation, e.g. a
    /// write to a read-only static file.
    #[error("operation not supported: {0}")]
    NotSupported(&'static str),

    /// Bad input written to an operation's invoke file.
    #[error("invalid invocation: {0}")]
    Validation(String),

    /// A connector call underneath the node failed.
    #[error(transparent)]
    Connector(#[from] ConnectorError),
}
