//! Revert diagnosis types

use alloy::primitives::Bytes;
use serde::{Deserialize, Serialize};

/// Structured interpretation of a revert payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RevertDiagnosis {
    /// `Error(string)` revert, as produced by `require`/`revert("...")`
    StandardError { message: String },
    /// `Panic(uint256)` raised by the compiler-inserted checks
    Panic { code: String, meaning: String },
    /// Selector found in the table of known error signatures
    KnownSelector { signature: String },
    /// Selector not found in any table
    CustomError { selector: String },
}

impl RevertDiagnosis {
    /// Name of the variant, matching the serialized `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            RevertDiagnosis::StandardError { .. } => "StandardError",
            RevertDiagnosis::Panic { .. } => "Panic",
            RevertDiagnosis::KnownSelector { .. } => "KnownSelector",
            RevertDiagnosis::CustomError { .. } => "CustomError",
        }
    }
}

/// Result of diagnosing a failed call.
///
/// `reason` is never empty. When `diagnosis` is present the reason is
/// derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertReason {
    pub reason: String,
    /// Raw revert payload, when one could be located in the error
    #[serde(rename = "revertData", skip_serializing_if = "Option::is_none")]
    pub revert_data: Option<Bytes>,
    #[serde(rename = "decodedError", skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<RevertDiagnosis>,
}
