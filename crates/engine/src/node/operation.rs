//! Operation directories
//!
//! Each remote operation mounts as a directory holding a generated `usage`
//! file, a writable `invoke` file, an optional `description`, and
//! `results`/`error` logs that appear lazily once the first line is
//! appended to them.

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use connector::{Bean, Connector, ConnectorError, InvokeOutcome, Operation};
use tracing::{debug, warn};

use super::file::{DynamicFile, LogFile, StaticFile};
use super::{Directory, FileNode, Node};
use crate::error::FsError;
use crate::invoke::parse_invocation;

/// Build the directory for one operation signature.
pub fn build_operation_dir(
    connector: Arc<dyn Connector>,
    bean: &Bean,
    operation: Operation,
) -> Arc<Directory> {
    let dir = Directory::new(operation.name.clone());
    let operation = Arc::new(operation);

    let usage_bean = bean.object_name().to_string();
    let usage_op = operation.clone();
    dir.add_child(Node::File(Arc::new(DynamicFile::new("usage", move || {
        usage_text(&usage_bean, &usage_op)
    }))));

    if let Some(description) = &operation.description {
        dir.add_child(Node::File(Arc::new(StaticFile::new(
            "description",
            description.clone(),
        ))));
    }

    dir.add_child(Node::File(Arc::new(InvokeFile::new(
        bean.clone(),
        operation,
        connector,
        Arc::downgrade(&dir),
    ))));

    dir
}

/// Render the human-readable usage sheet for an operation.
fn usage_text(bean_name: &str, operation: &Operation) -> String {
    let mut args_string = String::new();
    for param in operation.params() {
        args_string.push_str(&param.display_name());
        args_string.push(' ');
    }

    let mut text = format!(
        "Mbean: {}\nOperation: {}\nDescription: {}\nReturn Type: {}\n\n\
         Usage: echo {}[identifier] > invoke\n\nArguments:\n",
        bean_name,
        operation.name,
        operation.description.as_deref().unwrap_or(""),
        operation.return_type,
        args_string,
    );

    if !operation.params().is_empty() {
        for param in operation.params() {
            text.push_str(&format!(
                "\t{}\t({})\t{}\n",
                param.display_name(),
                param.param_type,
                param.description.as_deref().unwrap_or(""),
            ));
        }
        text.push_str(
            "\tidentifier\t\t\tAn identifier which will be appended \
             to each line of the result (Optional)\n\n\
             Arguments may be split by space, tab or carriage return\n",
        );
    }

    text
}

/// The write-to-invoke control file of an operation.
///
/// Writing whitespace-delimited tokens triggers a remote invocation;
/// reading returns the one-line expected argument list, never the
/// invocation history (that lives in `results`).
pub struct InvokeFile {
    bean: Bean,
    operation: Arc<Operation>,
    connector: Arc<dyn Connector>,
    parent: Weak<Directory>,
    results: Arc<LogFile>,
    errors: Arc<LogFile>,
}

impl InvokeFile {
    fn new(
        bean: Bean,
        operation: Arc<Operation>,
        connector: Arc<dyn Connector>,
        parent: Weak<Directory>,
    ) -> Self {
        Self {
            bean,
            operation,
            connector,
            parent,
            results: Arc::new(LogFile::new("results")),
            errors: Arc::new(LogFile::new("error")),
        }
    }

    /// Append a line to a log, attaching the log file to the operation
    /// directory on first use so it only shows up once it has content.
    fn append_log(&self, log: &Arc<LogFile>, line: &str) {
        log.append(line);
        if let Some(dir) = self.parent.upgrade() {
            if dir.get(log.name()).is_none() {
                dir.add_child(Node::File(log.clone()));
            }
        }
    }

    fn timestamp() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl std::fmt::Debug for InvokeFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvokeFile")
            .field("bean", &self.bean)
            .field("operation", &self.operation.name)
            .finish()
    }
}

#[async_trait]
impl FileNode for InvokeFile {
    fn name(&self) -> &str {
        "invoke"
    }

    fn mode(&self) -> u32 {
        0o660
    }

    /// A synthesized one-line usage hint listing the expected arguments.
    async fn read(&self) -> Result<String, FsError> {
        let names: Vec<String> = self
            .operation
            .params()
            .iter()
            .map(|p| p.display_name())
            .collect();
        Ok(format!("{}\n", names.join(" ")))
    }

    async fn write(&self, input: &str) -> Result<(), FsError> {
        let timestamp = Self::timestamp();

        let invocation = match parse_invocation(input, self.operation.params().len()) {
            Ok(invocation) => invocation,
            Err(e) => {
                warn!(operation = %self.operation.name, error = %e, "invoke rejected");
                self.append_log(&self.errors, &format!("{} {}\n", timestamp, e));
                return Err(FsError::Validation(e.to_string()));
            }
        };

        // Bind request values onto a cloned parameter list; the declared
        // parameters held by the snapshot stay untouched.
        let mut params = self.operation.params().to_vec();
        for (param, arg) in params.iter_mut().zip(&invocation.args) {
            param.set_request_value(arg.clone());
        }

        debug!(
            operation = %self.operation.name,
            args = invocation.args.len(),
            "invoking operation"
        );

        let outcome = match self
            .connector
            .invoke(&self.bean, &self.operation, &params)
            .await
        {
            Ok(outcome) => outcome,
            // A remote refusal is still an answer; it goes in the results
            // log next to the correlation id instead of failing the write.
            Err(ConnectorError::OperationInvoke(message)) => InvokeOutcome {
                error: Some(message),
                text: String::new(),
            },
            Err(e) => return Err(e.into()),
        };

        let identifier = invocation.correlation_id.unwrap_or_default();
        let line = format!("{} {}: {}\n", timestamp, identifier, outcome.message());
        self.append_log(&self.results, &line);

        Ok(())
    }
}
