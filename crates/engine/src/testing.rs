//! Scripted in-memory connector for unit tests
//!
//! Stands in for the network: beans, attributes, operations, and values are
//! set up in advance, every call is counted, and failures can be injected
//! per concern.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use connector::{
    Attribute, Bean, Connector, ConnectorError, InvokeOutcome, Operation, OperationParameter,
};
use parking_lot::Mutex;

/// One recorded call to [`Connector::invoke`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInvocation {
    pub operation: String,
    pub args: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MockConnector {
    beans: Vec<Bean>,
    attributes: HashMap<String, Vec<Attribute>>,
    operations: HashMap<String, Vec<Operation>>,
    values: Mutex<HashMap<(String, String), String>>,
    invocations: Mutex<Vec<RecordedInvocation>>,

    fail_enumeration: bool,
    failing_beans: HashSet<String>,
    failing_writes: HashSet<String>,
    invoke_error: Option<String>,
    invoke_result: Option<String>,

    list_beans_calls: AtomicUsize,
    get_attribute_count: AtomicUsize,
    set_attribute_count: AtomicUsize,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bean(mut self, name: &str) -> Self {
        self.beans.push(Bean::new(name));
        self
    }

    pub fn with_attribute(mut self, bean: &str, attribute: Attribute) -> Self {
        self.attributes
            .entry(bean.to_string())
            .or_default()
            .push(attribute);
        self
    }

    pub fn with_attribute_value(self, bean: &str, attribute: &str, value: &str) -> Self {
        self.values.lock().insert(
            (bean.to_string(), attribute.to_string()),
            value.to_string(),
        );
        self
    }

    pub fn with_operation(mut self, bean: &str, operation: Operation) -> Self {
        self.operations
            .entry(bean.to_string())
            .or_default()
            .push(operation);
        self
    }

    /// Make `list_beans` itself fail.
    pub fn with_enumeration_failure(mut self) -> Self {
        self.fail_enumeration = true;
        self
    }

    /// Make metadata listing fail for one bean (by object name).
    pub fn with_failing_bean(mut self, bean: &str) -> Self {
        self.failing_beans.insert(bean.to_string());
        self
    }

    /// Make attribute writes to the named attribute fail remotely.
    pub fn with_write_failure(mut self, attribute: &str) -> Self {
        self.failing_writes.insert(attribute.to_string());
        self
    }

    /// Fixed invoke result text (default is an echo of the call).
    pub fn with_invoke_result(mut self, text: &str) -> Self {
        self.invoke_result = Some(text.to_string());
        self
    }

    /// Make every invoke fail with a remote error message.
    pub fn with_invoke_error(mut self, message: &str) -> Self {
        self.invoke_error = Some(message.to_string());
        self
    }

    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.lock().clone()
    }

    pub fn attribute_value(&self, bean: &str, attribute: &str) -> Option<String> {
        self.values
            .lock()
            .get(&(bean.to_string(), attribute.to_string()))
            .cloned()
    }

    pub fn list_beans_calls(&self) -> usize {
        self.list_beans_calls.load(Ordering::SeqCst)
    }

    pub fn get_attribute_calls(&self) -> usize {
        self.get_attribute_count.load(Ordering::SeqCst)
    }

    pub fn set_attribute_calls(&self) -> usize {
        self.set_attribute_count.load(Ordering::SeqCst)
    }

    fn check_bean(&self, bean: &Bean) -> Result<(), ConnectorError> {
        if self.failing_beans.contains(bean.object_name()) {
            return Err(ConnectorError::Protocol(format!(
                "scripted failure for {}",
                bean.object_name()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn list_beans(&self) -> Result<Vec<Bean>, ConnectorError> {
        self.list_beans_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_enumeration {
            return Err(ConnectorError::Connectivity(
                "scripted enumeration failure".to_string(),
            ));
        }
        Ok(self.beans.clone())
    }

    async fn list_attributes(&self, bean: &Bean) -> Result<Vec<Attribute>, ConnectorError> {
        self.check_bean(bean)?;
        Ok(self
            .attributes
            .get(bean.object_name())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_operations(&self, bean: &Bean) -> Result<Vec<Operation>, ConnectorError> {
        self.check_bean(bean)?;
        Ok(self
            .operations
            .get(bean.object_name())
            .cloned()
            .unwrap_or_default())
    }

    async fn get_attribute(
        &self,
        bean: &Bean,
        name: &str,
    ) -> Result<Option<String>, ConnectorError> {
        self.get_attribute_count.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .values
            .lock()
            .get(&(bean.object_name().to_string(), name.to_string()))
            .cloned())
    }

    async fn set_attribute(
        &self,
        bean: &Bean,
        name: &str,
        value: &str,
    ) -> Result<(), ConnectorError> {
        self.set_attribute_count.fetch_add(1, Ordering::SeqCst);
        if self.failing_writes.contains(name) {
            return Err(ConnectorError::AttributeWrite(format!(
                "scripted write failure for {}",
                name
            )));
        }
        self.values.lock().insert(
            (bean.object_name().to_string(), name.to_string()),
            value.to_string(),
        );
        Ok(())
    }

    async fn invoke(
        &self,
        _bean: &Bean,
        operation: &Operation,
        params: &[OperationParameter],
    ) -> Result<InvokeOutcome, ConnectorError> {
        let args: Vec<String> = params
            .iter()
            .filter_map(|p| p.request_value.clone())
            .collect();
        self.invocations.lock().push(RecordedInvocation {
            operation: operation.name.clone(),
            args,
        });

        if let Some(message) = &self.invoke_error {
            return Err(ConnectorError::OperationInvoke(message.clone()));
        }

        let text = self
            .invoke_result
            .clone()
            .unwrap_or_else(|| format!("invoked {}", operation.name));
        Ok(InvokeOutcome::ok(text))
    }

    async fn test_connectivity(&self) -> Result<(), ConnectorError> {
        if self.fail_enumeration {
            return Err(ConnectorError::Connectivity(
                "scripted enumeration failure".to_string(),
            ));
        }
        Ok(())
    }

    fn endpoint(&self) -> String {
        "testhost:8778".to_string()
    }
}
