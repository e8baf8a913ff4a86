//! Attribute files
//!
//! One file per bean attribute. Reads and writes delegate straight to the
//! connector, so the file always reflects live remote state; nothing is
//! cached between accesses.

use std::sync::Arc;

use async_trait::async_trait;
use connector::{Attribute, Bean, Connector};
use tracing::debug;

use super::FileNode;
use crate::error::FsError;

/// A readable/writable file bound to one remote attribute.
#[derive(Debug)]
pub struct AttributeFile {
    bean: Bean,
    attribute: Attribute,
    connector: Arc<dyn Connector>,
}

impl AttributeFile {
    pub fn new(bean: Bean, attribute: Attribute, connector: Arc<dyn Connector>) -> Self {
        Self {
            bean,
            attribute,
            connector,
        }
    }
}

#[async_trait]
impl FileNode for AttributeFile {
    fn name(&self) -> &str {
        &self.attribute.name
    }

    /// 0o440 when only readable, 0o660 when also writable, 0o220 for the
    /// degenerate write-only case.
    fn mode(&self) -> u32 {
        let mut mode = 0;
        if self.attribute.readable {
            mode |= 0o440;
        }
        if self.attribute.writable {
            mode |= 0o220;
        }
        mode
    }

    /// Fetch the live value. A null remote value reads as an empty string;
    /// every read is newline-terminated.
    async fn read(&self) -> Result<String, FsError> {
        let value = self
            .connector
            .get_attribute(&self.bean, &self.attribute.name)
            .await?;
        Ok(format!("{}\n", value.unwrap_or_default()))
    }

    /// Push a new value to the remote. A non-writable attribute refuses
    /// before any network traffic; a remote failure surfaces as an error
    /// and leaves the attribute untouched locally.
    async fn write(&self, input: &str) -> Result<(), FsError> {
        if !self.attribute.writable {
            return Err(FsError::NotSupported("write"));
        }
        debug!(bean = %self.bean, attribute = %self.attribute.name, "attribute write");
        self.connector
            .set_attribute(&self.bean, &self.attribute.name, input)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockConnector;
    use connector::ConnectorError;

    fn heap_bean() -> Bean {
        Bean::new("java.lang:type=Memory")
    }

    #[test]
    fn test_mode_bits() {
        let connector: Arc<dyn Connector> = Arc::new(MockConnector::new());

        let read_only = AttributeFile::new(
            heap_bean(),
            Attribute::new("Used", true, false),
            connector.clone(),
        );
        assert_eq!(read_only.mode(), 0o440);

        let read_write = AttributeFile::new(
            heap_bean(),
            Attribute::new("Verbose", true, true),
            connector.clone(),
        );
        assert_eq!(read_write.mode(), 0o660);

        let write_only =
            AttributeFile::new(heap_bean(), Attribute::new("Secret", false, true), connector);
        assert_eq!(write_only.mode(), 0o220);
    }

    #[tokio::test]
    async fn test_read_fetches_once_with_newline() {
        let mock = Arc::new(
            MockConnector::new().with_attribute_value("java.lang:type=Memory", "Used", "12345"),
        );
        let file = AttributeFile::new(
            heap_bean(),
            Attribute::new("Used", true, false),
            mock.clone() as Arc<dyn Connector>,
        );

        assert_eq!(file.read().await.unwrap(), "12345\n");
        assert_eq!(mock.get_attribute_calls(), 1);
    }

    #[tokio::test]
    async fn test_null_value_reads_as_empty() {
        let mock = Arc::new(MockConnector::new());
        let file = AttributeFile::new(
            heap_bean(),
            Attribute::new("Missing", true, false),
            mock as Arc<dyn Connector>,
        );

        assert_eq!(file.read().await.unwrap(), "\n");
    }

    #[tokio::test]
    async fn test_write_to_read_only_is_not_supported() {
        let mock = Arc::new(MockConnector::new());
        let file = AttributeFile::new(
            heap_bean(),
            Attribute::new("Used", true, false),
            mock.clone() as Arc<dyn Connector>,
        );

        assert!(matches!(
            file.write("1").await,
            Err(FsError::NotSupported("write"))
        ));
        // Refused locally; the connector never saw the write.
        assert_eq!(mock.set_attribute_calls(), 0);
    }

    #[tokio::test]
    async fn test_write_round_trips_through_connector() {
        let mock = Arc::new(MockConnector::new());
        let file = AttributeFile::new(
            heap_bean(),
            Attribute::new("Verbose", true, true),
            mock.clone() as Arc<dyn Connector>,
        );

        file.write("true").await.unwrap();
        assert_eq!(
            mock.attribute_value("java.lang:type=Memory", "Verbose"),
            Some("true".to_string())
        );
    }

    #[tokio::test]
    async fn test_remote_write_failure_maps_to_error() {
        let mock = Arc::new(MockConnector::new().with_write_failure("Verbose"));
        let file = AttributeFile::new(
            heap_bean(),
            Attribute::new("Verbose", true, true),
            mock as Arc<dyn Connector>,
        );

        assert!(matches!(
            file.write("true").await,
            Err(FsError::Connector(ConnectorError::AttributeWrite(_)))
        ));
    }
}
