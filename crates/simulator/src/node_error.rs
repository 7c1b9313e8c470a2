//! Normalised shape of a failed node request
//!
//! Nodes report failures in several layouts: the revert payload may sit in
//! the JSON-RPC `data` field, be embedded as a hex literal in a textual
//! reason, or be wrapped one level deeper in a nested error object.
//! [`NodeError`] captures all of them so the diagnosis step can probe the
//! sources in a fixed order.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// JSON-RPC error code used by geth-compatible nodes for reverted calls
pub const CALL_EXCEPTION_CODE: i64 = 3;

static HEX_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0x[a-fA-F0-9]+").expect("hex literal pattern"));

/// A failed node request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeError {
    /// Human-readable message as reported by the node or transport
    pub message: String,
    /// JSON-RPC error code, if the node answered with an error object
    pub code: Option<i64>,
    /// Revert payload as a `0x` hex string
    pub data: Option<String>,
    /// Free-text reason some clients attach next to the message
    pub reason: Option<String>,
    /// Inner error object some providers wrap the real failure in
    pub nested: Option<Box<NodeError>>,
}

impl NodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_nested(mut self, nested: NodeError) -> Self {
        self.nested = Some(Box::new(nested));
        self
    }

    /// Payload carried directly in the `data` field
    pub fn direct_payload(&self) -> Option<&str> {
        self.data.as_deref().filter(|d| !d.is_empty())
    }

    /// First `0x…` literal embedded in the `reason` field
    pub fn embedded_payload_in_reason(&self) -> Option<&str> {
        let reason = self.reason.as_deref()?;
        if !reason.contains("0x") {
            return None;
        }
        HEX_LITERAL.find(reason).map(|m| m.as_str())
    }

    /// Payload carried in the nested error's `data` field
    pub fn nested_payload(&self) -> Option<&str> {
        self.nested.as_deref().and_then(NodeError::direct_payload)
    }

    /// Revert payload from the first source that has one
    pub fn revert_payload(&self) -> Option<&str> {
        self.direct_payload()
            .or_else(|| self.embedded_payload_in_reason())
            .or_else(|| self.nested_payload())
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for NodeError {}
