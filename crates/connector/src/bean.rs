//! The remote bean model
//!
//! [`Bean`] wraps a composite object name of the form
//! `domain:key1=val1,key2=val2,...` and derives the canonical path-segment
//! sequence the tree builder mounts it under. Attributes and operations are
//! plain metadata records filled in by a connector backend.

use serde::{Deserialize, Serialize};

/// A remotely managed object, identified by its composite name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bean {
    name: String,
}

impl Bean {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The full composite object name, e.g.
    /// `java.lang:type=GarbageCollector,name=PS MarkSweep`.
    pub fn object_name(&self) -> &str {
        &self.name
    }

    /// The domain part (everything before the first `:`).
    pub fn domain(&self) -> &str {
        match self.name.split_once(':') {
            Some((domain, _)) => domain,
            None => &self.name,
        }
    }

    /// The property list part (everything after the first `:`).
    pub fn properties(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, props)) => props,
            None => "",
        }
    }

    /// Derive the path-segment sequence this bean mounts under, mirroring
    /// the hierarchy a management console would show.
    ///
    /// The domain is always the first segment. Each `key=value` property
    /// contributes its value, with a trailing `/` stripped. A fully quoted
    /// value stays one segment (quotes removed); an unquoted value is
    /// further split on `/` into multiple segments. Two beans whose decoded
    /// segments collide end up at the same directory path; detecting that
    /// is the tree builder's problem, not the derivation's.
    pub fn path_segments(&self) -> Vec<String> {
        let mut segments = vec![self.domain().to_string()];

        let properties = self.properties();
        if properties.is_empty() {
            return segments;
        }

        for pair in properties.split(',') {
            let value = match pair.split_once('=') {
                Some((_, value)) => value,
                None => pair,
            };
            let value = value.strip_suffix('/').unwrap_or(value);

            if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                segments.push(value[1..value.len() - 1].to_string());
            } else {
                for part in value.split('/') {
                    segments.push(part.to_string());
                }
            }
        }

        segments
    }
}

impl std::fmt::Display for Bean {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A named attribute on a bean. The two flags are independent; an
/// attribute may be readable, writable, both, or (degenerately) neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub readable: bool,
    pub writable: bool,
}

impl Attribute {
    pub fn new(name: impl Into<String>, readable: bool, writable: bool) -> Self {
        Self {
            name: name.into(),
            readable,
            writable,
        }
    }
}

/// One declared parameter of an operation signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationParameter {
    /// Declared numeric id; parameter order is ascending id.
    pub id: usize,
    /// Remote type name, e.g. `java.lang.String`.
    pub param_type: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Transient request value bound immediately before invocation.
    /// Never set on the declared parameters held by a snapshot; the
    /// invocation path binds values onto a cloned list.
    pub request_value: Option<String>,
}

impl OperationParameter {
    pub fn new(id: usize, param_type: impl Into<String>) -> Self {
        Self {
            id,
            param_type: param_type.into(),
            name: None,
            description: None,
            request_value: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_request_value(&mut self, value: impl Into<String>) {
        self.request_value = Some(value.into());
    }

    /// Display name for usage output: declared name or `arg<id>`.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.replace(' ', "_"),
            None => format!("arg{}", self.id),
        }
    }
}

/// A remotely invokable operation signature on a bean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub name: String,
    params: Vec<OperationParameter>,
    pub return_type: String,
    pub description: Option<String>,
}

impl Operation {
    /// Build an operation, ordering the parameter list by ascending
    /// declared id.
    pub fn new(
        name: impl Into<String>,
        mut params: Vec<OperationParameter>,
        return_type: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        params.sort_by_key(|p| p.id);
        Self {
            name: name.into(),
            params,
            return_type: return_type.into(),
            description,
        }
    }

    /// Declared parameters, ascending id.
    pub fn params(&self) -> &[OperationParameter] {
        &self.params
    }
}

/// Outcome of an operation invocation: an optional remote error message
/// plus the textual result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokeOutcome {
    pub error: Option<String>,
    pub text: String,
}

impl InvokeOutcome {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            error: None,
            text: text.into(),
        }
    }

    /// The line-worthy message: the error prefixed to the result text when
    /// the remote reported one.
    pub fn message(&self) -> String {
        match &self.error {
            Some(err) => format!("{} {}", err, self.text),
            None => self.text.clone(),
        }
    }
}
