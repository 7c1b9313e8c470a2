//! Revert diagnosis
//!
//! Turns a failed call into a [`RevertReason`]. Decoding is total: a
//! payload that cannot be decoded degrades to a textual reason and never
//! produces an error.

use crate::node_error::{NodeError, CALL_EXCEPTION_CODE};
use alloy::hex;
use alloy::primitives::{Bytes, U256};
use alloy::sol_types::{sol_data, Panic, SolError, SolType};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use types::{RevertDiagnosis, RevertReason};

const SELECTOR_LEN: usize = 4;

/// Reason used when nothing better can be extracted
pub const GENERIC_REVERT_REASON: &str = "Transaction would revert";

type PayloadDecoder = fn(&[u8]) -> DecodedPayload;

/// A selector with a known signature, optionally with a body decoder
struct ErrorSignature {
    selector: [u8; 4],
    signature: &'static str,
    decoder: Option<PayloadDecoder>,
}

/// Selectors recognised without an ABI
const KNOWN_ERRORS: &[ErrorSignature] = &[
    ErrorSignature {
        selector: [0x08, 0xc3, 0x79, 0xa0],
        signature: "Error(string)",
        decoder: Some(decode_error_string),
    },
    ErrorSignature {
        selector: [0x4e, 0x48, 0x7b, 0x71],
        signature: "Panic(uint256)",
        decoder: Some(decode_panic),
    },
    ErrorSignature {
        selector: [0xf4, 0x84, 0x48, 0x14],
        signature: "InsufficientBalance(uint256,uint256)",
        decoder: None,
    },
];

/// Solidity panic codes
const PANIC_CODES: &[(u64, &str)] = &[
    (0x00, "Generic panic"),
    (0x01, "Assertion failed"),
    (0x11, "Arithmetic overflow/underflow"),
    (0x12, "Division by zero"),
    (0x21, "Enum conversion error"),
    (0x22, "Invalid storage byte array access"),
    (0x31, "Pop from empty array"),
    (0x32, "Array index out of bounds"),
    (0x41, "Memory allocation overflow"),
    (0x51, "Zero-initialized variable of internal function type"),
];

/// Patterns capturing the interesting tail of a node message, first match wins
static MESSAGE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)execution reverted: (.+)",
        r"(?i)revert (.+)",
        r"(?i)VM Exception while processing transaction: revert (.+)",
        r"(?i)reverted with reason string '(.+)'",
        r"(?i)transaction failed: (.+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("revert message pattern"))
    .collect()
});

/// Well-known node rejections mapped to a fixed reason
const FIXED_REASONS: &[(&str, &str)] = &[
    ("insufficient funds", "Insufficient funds for transaction"),
    ("gas required exceeds allowance", "Gas limit too low"),
    ("nonce too low", "Nonce too low"),
    ("replacement transaction underpriced", "Replacement transaction underpriced"),
];

/// Outcome of decoding a payload body
#[derive(Debug, Clone, PartialEq, Eq)]
struct DecodedPayload {
    reason: String,
    diagnosis: Option<RevertDiagnosis>,
}

/// Diagnose a failed call.
///
/// A payload longer than the selector is decoded by selector dispatch.
/// Otherwise the reason is pulled out of the error message and only the
/// raw payload, if any, is attached.
pub fn diagnose(error: &NodeError) -> RevertReason {
    let payload = extract_payload(error);

    if let Some(bytes) = payload.as_ref().filter(|p| p.len() > SELECTOR_LEN) {
        let decoded = decode_payload(bytes);
        debug!(
            selector = %hex::encode_prefixed(&bytes[..SELECTOR_LEN]),
            kind = decoded.diagnosis.as_ref().map(RevertDiagnosis::kind),
            "Decoded revert payload"
        );
        return RevertReason {
            reason: decoded.reason,
            revert_data: Some(bytes.clone()),
            diagnosis: decoded.diagnosis,
        };
    }

    RevertReason {
        reason: extract_human_readable_reason(&error.message),
        revert_data: payload,
        diagnosis: None,
    }
}

/// Whether the failure looks like an on-chain rejection rather than an
/// infrastructure problem
pub fn is_revert_failure(error: &NodeError) -> bool {
    let message = error.message.to_lowercase();

    message.contains("revert")
        || message.contains("execution reverted")
        || message.contains("transaction failed")
        || error.code == Some(CALL_EXCEPTION_CODE)
        || error.reason.as_deref().is_some_and(|r| r.contains("revert"))
}

fn extract_payload(error: &NodeError) -> Option<Bytes> {
    let raw = error.revert_payload()?;
    match hex::decode(raw.strip_prefix("0x").unwrap_or(raw)) {
        Ok(bytes) => Some(Bytes::from(bytes)),
        Err(e) => {
            debug!(payload = %raw, error = %e, "Ignoring malformed revert payload");
            None
        }
    }
}

fn decode_payload(payload: &[u8]) -> DecodedPayload {
    let (selector, body) = payload.split_at(SELECTOR_LEN);

    match KNOWN_ERRORS.iter().find(|known| known.selector == selector) {
        Some(ErrorSignature {
            decoder: Some(decoder),
            ..
        }) => decoder(body),
        Some(known) => DecodedPayload {
            reason: format!("Known error: {}", known.signature),
            diagnosis: Some(RevertDiagnosis::KnownSelector {
                signature: known.signature.to_string(),
            }),
        },
        None => {
            let selector = hex::encode_prefixed(selector);
            DecodedPayload {
                reason: format!("Custom error with selector {}", selector),
                diagnosis: Some(RevertDiagnosis::CustomError { selector }),
            }
        }
    }
}

/// ABI parameters of `Error(string)`, read as raw bytes so UTF-8 is checked strictly
type ErrorStringParams = (sol_data::Bytes,);

fn decode_error_string(body: &[u8]) -> DecodedPayload {
    let decoded = <ErrorStringParams as SolType>::abi_decode_params(body, true)
        .map_err(|e| e.to_string())
        .and_then(|(raw,)| String::from_utf8(raw.to_vec()).map_err(|e| e.to_string()));

    match decoded {
        Ok(message) => {
            // Empty revert strings still need a usable reason
            let reason = if message.trim().is_empty() {
                GENERIC_REVERT_REASON.to_string()
            } else {
                message.clone()
            };
            DecodedPayload {
                reason,
                diagnosis: Some(RevertDiagnosis::StandardError { message }),
            }
        }
        Err(e) => {
            debug!(error = %e, "Error(string) body did not decode");
            DecodedPayload {
                reason: "Error(string) - decode failed".to_string(),
                diagnosis: None,
            }
        }
    }
}

fn decode_panic(body: &[u8]) -> DecodedPayload {
    match Panic::abi_decode_raw(body, true) {
        Ok(panic) => {
            let code = panic.code.to_string();
            let meaning = panic_meaning(panic.code);
            DecodedPayload {
                reason: format!("Panic: {} ({})", meaning, code),
                diagnosis: Some(RevertDiagnosis::Panic { code, meaning }),
            }
        }
        Err(e) => {
            debug!(error = %e, "Panic(uint256) body did not decode");
            DecodedPayload {
                reason: "Panic(uint256) - decode failed".to_string(),
                diagnosis: None,
            }
        }
    }
}

/// Human-readable meaning of a panic code
pub fn panic_meaning(code: U256) -> String {
    u64::try_from(code)
        .ok()
        .and_then(|code| PANIC_CODES.iter().find(|(known, _)| *known == code))
        .map(|(_, meaning)| meaning.to_string())
        .unwrap_or_else(|| format!("Unknown panic code: {}", code))
}

fn extract_human_readable_reason(message: &str) -> String {
    for pattern in MESSAGE_PATTERNS.iter() {
        let captured = pattern
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|rest| !rest.is_empty());

        if let Some(rest) = captured {
            return rest.to_string();
        }
    }

    if let Some((_, reason)) = FIXED_REASONS.iter().find(|(needle, _)| message.contains(needle)) {
        return reason.to_string();
    }

    let cleaned = message.strip_prefix("Error: ").unwrap_or(message).trim();
    if cleaned.is_empty() {
        GENERIC_REVERT_REASON.to_string()
    } else {
        cleaned.to_string()
    }
}
