//! Invoke-file input parsing
//!
//! A write to an operation's `invoke` file supplies whitespace-delimited
//! tokens. With `P` declared parameters: exactly `P` tokens bind
//! positionally; exactly `P + 1` tokens additionally carry a trailing
//! caller-supplied correlation id; anything else is rejected before any
//! invocation happens.

/// A parsed invoke request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Argument tokens, one per declared parameter, in declaration order.
    pub args: Vec<String>,
    /// Optional caller-supplied identifier echoed into the results log.
    pub correlation_id: Option<String>,
}

/// Rejection of an invoke request. The display text is the exact line body
/// appended to the operation's error log.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    #[error("Invalid usage. Not enough arguments {raw}")]
    NotEnoughArguments { raw: String },
    #[error("Invalid usage. Too many arguments: {raw}")]
    TooManyArguments { raw: String },
}

/// Split an invoke-file write into bound arguments and an optional
/// correlation id, validating arity against `param_count`.
pub fn parse_invocation(input: &str, param_count: usize) -> Result<Invocation, InvocationError> {
    let raw = input.trim();
    let mut tokens: Vec<String> = raw.split_whitespace().map(str::to_string).collect();

    if tokens.len() < param_count {
        return Err(InvocationError::NotEnoughArguments {
            raw: raw.to_string(),
        });
    }
    if tokens.len() > param_count + 1 {
        return Err(InvocationError::TooManyArguments {
            raw: raw.to_string(),
        });
    }

    let correlation_id = if tokens.len() == param_count + 1 {
        tokens.pop()
    } else {
        None
    };

    Ok(Invocation {
        args: tokens,
        correlation_id,
    })
}
