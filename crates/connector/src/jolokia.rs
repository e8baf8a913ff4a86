//! Jolokia JSON-over-HTTP connector
//!
//! Speaks the Jolokia agent protocol against `http://<host>:<port>/jolokia`:
//! `list` for bean/attribute/operation enumeration, `read`/`write` for
//! attribute access, `exec` for operation invocation. All payloads are JSON.
//!
//! Requests carry a timeout and transport failures are retried a bounded
//! number of times with backoff before surfacing as
//! [`ConnectorError::Connectivity`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::bean::{Attribute, Bean, InvokeOutcome, Operation, OperationParameter};
use crate::error::ConnectorError;
use crate::Connector;

/// Configuration for the Jolokia HTTP client.
#[derive(Debug, Clone)]
pub struct JolokiaConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// How many times a request is attempted before giving up.
    pub retry_attempts: u32,
    /// Base backoff between attempts in milliseconds; doubles per attempt.
    pub backoff_ms: u64,
}

impl Default for JolokiaConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            retry_attempts: 3,
            backoff_ms: 250,
        }
    }
}

impl JolokiaConfig {
    /// Create a config from a timeout, keeping the default retry shape.
    pub fn from_timeout(timeout_secs: u64) -> Self {
        Self {
            timeout_secs,
            ..Self::default()
        }
    }
}

/// Connector backend over a Jolokia agent.
#[derive(Debug, Clone)]
pub struct JolokiaConnector {
    host: String,
    port: u16,
    base: Url,
    client: Client,
    config: JolokiaConfig,
}

impl JolokiaConnector {
    /// Build a connector for `http://<host>:<port>/jolokia`.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        config: JolokiaConfig,
    ) -> Result<Self, ConnectorError> {
        let host = host.into();
        let base = Url::parse(&format!("http://{}:{}/jolokia", host, port))
            .map_err(|e| ConnectorError::Connectivity(format!("invalid endpoint: {}", e)))?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConnectorError::Connectivity(e.to_string()))?;

        Ok(Self {
            host,
            port,
            base,
            client,
            config,
        })
    }

    /// GET a Jolokia path relative to the base URL, with bounded retry.
    async fn get_json(&self, path: &str) -> Result<Value, ConnectorError> {
        let url = format!("{}/{}", self.base, path);
        debug!(url = %url, "jolokia GET");

        let mut attempt = 0;
        let response = loop {
            match self.client.get(&url).send().await {
                Ok(response) => break response,
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.config.retry_attempts {
                        return Err(ConnectorError::Connectivity(e.to_string()));
                    }
                    let backoff = self.config.backoff_ms << (attempt - 1);
                    debug!(attempt, backoff_ms = backoff, "jolokia GET retry");
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
            }
        };

        if !response.status().is_success() {
            return Err(ConnectorError::Connectivity(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ConnectorError::Protocol(e.to_string()))
    }

    /// POST a Jolokia request body to the base URL, with bounded retry.
    async fn post_json(&self, body: &Value) -> Result<Value, ConnectorError> {
        debug!(body = %body, "jolokia POST");

        let mut attempt = 0;
        let response = loop {
            match self.client.post(self.base.clone()).json(body).send().await {
                Ok(response) => break response,
                Err(e) => {
                    attempt += 1;
                    if attempt >= self.config.retry_attempts {
                        return Err(ConnectorError::Connectivity(e.to_string()));
                    }
                    let backoff = self.config.backoff_ms << (attempt - 1);
                    debug!(attempt, backoff_ms = backoff, "jolokia POST retry");
                    tokio::time::sleep(Duration::from_millis(backoff)).await;
                }
            }
        };

        if !response.status().is_success() {
            return Err(ConnectorError::Connectivity(format!(
                "HTTP {} from {}",
                response.status(),
                self.base
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ConnectorError::Protocol(e.to_string()))
    }
}

#[async_trait]
impl Connector for JolokiaConnector {
    async fn list_beans(&self) -> Result<Vec<Bean>, ConnectorError> {
        let response = self.get_json("list?maxDepth=2").await?;
        parse_bean_list(&response)
    }

    async fn list_attributes(&self, bean: &Bean) -> Result<Vec<Attribute>, ConnectorError> {
        let path = format!(
            "list/{}/{}/attr",
            escape_name(bean.domain()),
            escape_name(bean.properties())
        );
        let response = self.get_json(&path).await?;
        parse_attributes(&response)
    }

    async fn list_operations(&self, bean: &Bean) -> Result<Vec<Operation>, ConnectorError> {
        let path = format!(
            "list/{}/{}/op",
            escape_name(bean.domain()),
            escape_name(bean.properties())
        );
        let response = self.get_json(&path).await?;
        parse_operations(&response)
    }

    async fn get_attribute(
        &self,
        bean: &Bean,
        name: &str,
    ) -> Result<Option<String>, ConnectorError> {
        let path = format!(
            "read/{}/{}",
            escape_name(bean.object_name()),
            escape_name(name)
        );
        let response = self.get_json(&path).await?;
        check_protocol_error(&response)?;

        match value_field(&response)? {
            Value::Null => Ok(None),
            value => Ok(Some(stringify_value(value))),
        }
    }

    async fn set_attribute(
        &self,
        bean: &Bean,
        name: &str,
        value: &str,
    ) -> Result<(), ConnectorError> {
        let body = json!({
            "type": "write",
            "mbean": bean.object_name(),
            "attribute": name,
            "value": value.trim(),
        });
        let response = self.post_json(&body).await?;

        if let Some(error) = response.get("error").and_then(Value::as_str) {
            return Err(ConnectorError::AttributeWrite(error.to_string()));
        }
        Ok(())
    }

    async fn invoke(
        &self,
        bean: &Bean,
        operation: &Operation,
        params: &[OperationParameter],
    ) -> Result<InvokeOutcome, ConnectorError> {
        let signature: Vec<&str> = params.iter().map(|p| p.param_type.as_str()).collect();
        let arguments: Vec<&str> = params
            .iter()
            .map(|p| p.request_value.as_deref().unwrap_or(""))
            .collect();

        let body = json!({
            "type": "exec",
            "mbean": bean.object_name(),
            "operation": format!("{}({})", operation.name, signature.join(",")),
            "arguments": arguments,
        });
        let response = self.post_json(&body).await?;

        if let Some(error) = response.get("error").and_then(Value::as_str) {
            return Err(ConnectorError::OperationInvoke(error.to_string()));
        }

        let text = match response.get("value") {
            None | Some(Value::Null) => String::new(),
            Some(value) => stringify_value(value),
        };
        Ok(InvokeOutcome::ok(text))
    }

    async fn test_connectivity(&self) -> Result<(), ConnectorError> {
        let response = self.get_json("version").await?;

        match response.get("status").and_then(Value::as_u64) {
            Some(200) => Ok(()),
            _ => {
                let message = response
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("agent rejected connectivity probe")
                    .to_string();
                Err(ConnectorError::Connectivity(message))
            }
        }
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Escape a name segment for embedding in a Jolokia request path:
/// `!` becomes `!!`, `/` becomes `!/`.
pub fn escape_name(name: &str) -> String {
    name.replace('!', "!!").replace('/', "!/")
}

/// Render an attribute/result value as text. Structured values (maps,
/// lists) are rendered as compact JSON; serde_json's map keeps keys
/// ordered, so the output is deterministic.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Fail with `Protocol` if the response carries a Jolokia `error` key.
fn check_protocol_error(response: &Value) -> Result<(), ConnectorError> {
    if let Some(error) = response.get("error").and_then(Value::as_str) {
        return Err(ConnectorError::Protocol(error.to_string()));
    }
    Ok(())
}

/// Extract the mandatory `value` field of a Jolokia response.
fn value_field(response: &Value) -> Result<&Value, ConnectorError> {
    response
        .get("value")
        .ok_or_else(|| ConnectorError::Protocol("response missing 'value' field".to_string()))
}

/// Parse a `list?maxDepth=2` response into beans. The value is a map of
/// domain to a map of property strings.
fn parse_bean_list(response: &Value) -> Result<Vec<Bean>, ConnectorError> {
    check_protocol_error(response)?;
    let domains = value_field(response)?
        .as_object()
        .ok_or_else(|| ConnectorError::Protocol("bean list value is not a map".to_string()))?;

    let mut beans = Vec::new();
    for (domain, subnames) in domains {
        let subnames = subnames.as_object().ok_or_else(|| {
            ConnectorError::Protocol(format!("domain '{}' entry is not a map", domain))
        })?;
        for properties in subnames.keys() {
            beans.push(Bean::new(format!("{}:{}", domain, properties)));
        }
    }
    Ok(beans)
}

/// Parse a `list/<domain>/<name>/attr` response. Each entry maps the
/// attribute name to its details; Jolokia reports readability implicitly
/// (everything listed is readable) and writability via `rw`.
fn parse_attributes(response: &Value) -> Result<Vec<Attribute>, ConnectorError> {
    check_protocol_error(response)?;
    let entries = value_field(response)?
        .as_object()
        .ok_or_else(|| ConnectorError::Protocol("attribute list value is not a map".to_string()))?;

    let mut attributes = Vec::new();
    for (name, details) in entries {
        let writable = details.get("rw").and_then(Value::as_bool).unwrap_or(false);
        attributes.push(Attribute::new(name.clone(), true, writable));
    }
    Ok(attributes)
}

/// Parse a `list/<domain>/<name>/op` response. An operation entry is either
/// a single signature object or a list of signatures for overloads; each
/// signature becomes its own [`Operation`].
fn parse_operations(response: &Value) -> Result<Vec<Operation>, ConnectorError> {
    check_protocol_error(response)?;
    let entries = value_field(response)?
        .as_object()
        .ok_or_else(|| ConnectorError::Protocol("operation list value is not a map".to_string()))?;

    let mut operations = Vec::new();
    for (name, entry) in entries {
        match entry {
            Value::Object(_) => operations.push(parse_signature(name, entry)?),
            Value::Array(signatures) => {
                for signature in signatures {
                    operations.push(parse_signature(name, signature)?);
                }
            }
            _ => {
                return Err(ConnectorError::Protocol(format!(
                    "operation '{}' entry is neither a signature nor a list",
                    name
                )))
            }
        }
    }
    Ok(operations)
}

fn parse_signature(name: &str, signature: &Value) -> Result<Operation, ConnectorError> {
    let args = signature
        .get("args")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ConnectorError::Protocol(format!("operation '{}' signature missing args", name))
        })?;

    let mut params = Vec::new();
    for (id, arg) in args.iter().enumerate() {
        let param_type = arg
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("java.lang.String");
        let mut param = OperationParameter::new(id, param_type);
        if let Some(arg_name) = arg.get("name").and_then(Value::as_str) {
            param = param.with_name(arg_name);
        }
        if let Some(desc) = arg.get("desc").and_then(Value::as_str) {
            param = param.with_description(desc);
        }
        params.push(param);
    }

    let return_type = signature
        .get("ret")
        .and_then(Value::as_str)
        .unwrap_or("void");
    let description = signature
        .get("desc")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Operation::new(name, params, return_type, description))
}
