//! Remote MBean introspection for beanfs
//!
//! A [`Connector`] abstracts a remote bean server: enumerate beans, inspect
//! their attributes and operations, read/write attribute values, and invoke
//! operations. The filesystem engine consumes this trait and never talks to
//! the wire directly, so alternative backends can be dropped in behind it.
//!
//! The only shipped backend is [`JolokiaConnector`], which speaks the
//! Jolokia JSON-over-HTTP protocol.

mod bean;
mod error;
mod jolokia;

pub use bean::{Attribute, Bean, InvokeOutcome, Operation, OperationParameter};
pub use error::ConnectorError;
pub use jolokia::{JolokiaConfig, JolokiaConnector};

use async_trait::async_trait;

/// Abstraction over a remote management-bean server.
///
/// All calls are fallible network operations; implementations are expected
/// to surface transport problems as [`ConnectorError::Connectivity`] and
/// malformed responses as [`ConnectorError::Protocol`].
#[async_trait]
pub trait Connector: Send + Sync + std::fmt::Debug {
    /// Enumerate every bean the server exposes.
    async fn list_beans(&self) -> Result<Vec<Bean>, ConnectorError>;

    /// List the attributes declared by a bean.
    async fn list_attributes(&self, bean: &Bean) -> Result<Vec<Attribute>, ConnectorError>;

    /// List the operations declared by a bean, one entry per signature.
    async fn list_operations(&self, bean: &Bean) -> Result<Vec<Operation>, ConnectorError>;

    /// Read an attribute value. `None` means the remote value is null.
    async fn get_attribute(
        &self,
        bean: &Bean,
        name: &str,
    ) -> Result<Option<String>, ConnectorError>;

    /// Write an attribute value.
    async fn set_attribute(
        &self,
        bean: &Bean,
        name: &str,
        value: &str,
    ) -> Result<(), ConnectorError>;

    /// Invoke an operation with its parameters bound to request values.
    async fn invoke(
        &self,
        bean: &Bean,
        operation: &Operation,
        params: &[OperationParameter],
    ) -> Result<InvokeOutcome, ConnectorError>;

    /// Probe the server; `Ok(())` means it is reachable and answering.
    async fn test_connectivity(&self) -> Result<(), ConnectorError>;

    /// The `host:port` endpoint this connector is bound to.
    fn endpoint(&self) -> String;
}
