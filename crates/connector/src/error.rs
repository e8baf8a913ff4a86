//! Connector error taxonomy
//!
//! A closed set of tagged error kinds. Message text travels as a field on
//! the variant, never inferred from a stringified trace, so callers can
//! match on the kind while still surfacing the remote detail.

/// Errors raised by a [`Connector`](crate::Connector) backend.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The backend is unreachable or rejected the connectivity probe.
    #[error("backend unreachable: {0}")]
    Connectivity(String),

    /// The backend answered with a malformed or unexpected response shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The backend refused an attribute write.
    #[error("attribute write failed: {0}")]
    AttributeWrite(String),

    /// The backend refused or failed an operation invocation.
    #[error("operation invocation failed: {0}")]
    OperationInvoke(String),
}

impl ConnectorError {
    /// The remote/server-side detail carried by this error.
    pub fn detail(&self) -> &str {
        match self {
            Self::Connectivity(msg)
            | Self::Protocol(msg)
            | Self::AttributeWrite(msg)
            | Self::OperationInvoke(msg) => msg,
        }
    }
}
