//! Request validation for the HTTP API

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, U256};
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;
use types::utils::{is_hex_string, is_valid_address};
use types::SimulationRequest;

/// A request field that failed validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Block selector as sent by clients: a tag or number string, or a JSON number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BlockParam {
    Number(u64),
    Text(String),
}

/// Raw body of `POST /simulate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateParams {
    pub to: String,
    pub data: String,
    pub from: Option<String>,
    pub value: Option<String>,
    pub chain_id: Option<String>,
    pub block_number: Option<BlockParam>,
}

impl SimulateParams {
    /// Validate and convert into a typed request
    pub fn into_request(self, default_chain_id: &str) -> Result<SimulationRequest, ValidationError> {
        let to = parse_address("to", &self.to)?;
        let data = parse_data(&self.data)?;

        let mut request = SimulationRequest::new(to, data).with_chain_id(
            self.chain_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| default_chain_id.to_string()),
        );

        if let Some(from) = self.from {
            request = request.with_from(parse_address("from", &from)?);
        }
        if let Some(value) = self.value {
            request = request.with_value(parse_value(&value)?);
        }
        if let Some(block) = self.block_number {
            request = request.with_block(parse_block(block)?);
        }

        Ok(request)
    }
}

/// `0x` followed by 40 hex characters
pub fn parse_address(field: &'static str, raw: &str) -> Result<Address, ValidationError> {
    if !is_valid_address(raw) {
        return Err(ValidationError::new(field, "expected 0x followed by 40 hex characters"));
    }
    Address::from_str(raw).map_err(|e| ValidationError::new(field, e.to_string()))
}

fn parse_data(raw: &str) -> Result<Bytes, ValidationError> {
    if !is_hex_string(raw) {
        return Err(ValidationError::new("data", "expected 0x-prefixed hex"));
    }
    if raw.len() % 2 != 0 {
        return Err(ValidationError::new("data", "hex payload has an odd number of digits"));
    }
    Bytes::from_str(raw).map_err(|e| ValidationError::new("data", e.to_string()))
}

fn parse_value(raw: &str) -> Result<U256, ValidationError> {
    if !is_hex_string(raw) {
        return Err(ValidationError::new("value", "expected 0x-prefixed hex"));
    }
    let digits = raw.trim_start_matches("0x");
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16).map_err(|e| ValidationError::new("value", e.to_string()))
}

/// Accepts `latest`, `pending`, `earliest`, `safe`, `finalized`, decimal and `0x` numbers
pub fn parse_block(block: BlockParam) -> Result<BlockNumberOrTag, ValidationError> {
    let raw = match block {
        BlockParam::Number(number) => return Ok(BlockNumberOrTag::Number(number)),
        BlockParam::Text(raw) => raw,
    };

    let parsed = match raw.trim().to_ascii_lowercase().as_str() {
        "latest" => Some(BlockNumberOrTag::Latest),
        "pending" => Some(BlockNumberOrTag::Pending),
        "earliest" => Some(BlockNumberOrTag::Earliest),
        "safe" => Some(BlockNumberOrTag::Safe),
        "finalized" => Some(BlockNumberOrTag::Finalized),
        other => parse_block_number(other).map(BlockNumberOrTag::Number),
    };

    parsed.ok_or_else(|| {
        ValidationError::new(
            "blockNumber",
            format!("expected a block tag or number, got {:?}", raw),
        )
    })
}

fn parse_block_number(raw: &str) -> Option<u64> {
    match raw.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

    fn params() -> SimulateParams {
        SimulateParams {
            to: TOKEN.to_string(),
            data: "0x70a08231".to_string(),
            from: None,
            value: None,
            chain_id: None,
            block_number: None,
        }
    }

    #[test]
    fn test_minimal_request_uses_defaults() {
        let request = params().into_request("1").unwrap();
        assert_eq!(request.chain_id, "1");
        assert_eq!(request.data.len(), 4);
        assert_eq!(request.from, None);
        assert_eq!(request.block(), BlockNumberOrTag::Latest);
    }

    #[test]
    fn test_full_request() {
        let request = SimulateParams {
            from: Some("0x000000000000000000000000000000000000dEaD".to_string()),
            value: Some("0xde0b6b3a7640000".to_string()),
            chain_id: Some("137".to_string()),
            block_number: Some(BlockParam::Text("0x10".to_string())),
            ..params()
        }
        .into_request("1")
        .unwrap();

        assert_eq!(request.chain_id, "137");
        assert_eq!(request.call_value(), U256::from(1_000_000_000_000_000_000u128));
        assert_eq!(request.block(), BlockNumberOrTag::Number(16));
        assert!(request.from.is_some());
    }

    #[test]
    fn test_invalid_fields_are_named() {
        let err = SimulateParams {
            to: "0x1234".to_string(),
            ..params()
        }
        .into_request("1")
        .unwrap_err();
        assert_eq!(err.field, "to");

        let err = SimulateParams {
            data: "70a08231".to_string(),
            ..params()
        }
        .into_request("1")
        .unwrap_err();
        assert_eq!(err.field, "data");

        let err = SimulateParams {
            data: "0x70a0823".to_string(),
            ..params()
        }
        .into_request("1")
        .unwrap_err();
        assert_eq!(err.field, "data");

        let err = SimulateParams {
            value: Some("100".to_string()),
            ..params()
        }
        .into_request("1")
        .unwrap_err();
        assert_eq!(err.field, "value");
    }

    #[test]
    fn test_empty_data_and_value() {
        let request = SimulateParams {
            data: "0x".to_string(),
            value: Some("0x".to_string()),
            ..params()
        }
        .into_request("1")
        .unwrap();
        assert!(request.data.is_empty());
        assert_eq!(request.call_value(), U256::ZERO);
    }

    #[test]
    fn test_block_parsing() {
        let text = |s: &str| BlockParam::Text(s.to_string());
        assert_eq!(parse_block(text("latest")).unwrap(), BlockNumberOrTag::Latest);
        assert_eq!(parse_block(text("Finalized")).unwrap(), BlockNumberOrTag::Finalized);
        assert_eq!(parse_block(text("18500000")).unwrap(), BlockNumberOrTag::Number(18_500_000));
        assert_eq!(parse_block(text("0x11a49a0")).unwrap(), BlockNumberOrTag::Number(18_500_000));
        assert_eq!(parse_block(BlockParam::Number(7)).unwrap(), BlockNumberOrTag::Number(7));
        assert_eq!(parse_block(text("yesterday")).unwrap_err().field, "blockNumber");
    }

    #[test]
    fn test_params_deserialize_camel_case() {
        let params: SimulateParams = serde_json::from_value(serde_json::json!({
            "to": TOKEN,
            "data": "0x",
            "chainId": "8453",
            "blockNumber": 123
        }))
        .unwrap();
        assert_eq!(params.chain_id.as_deref(), Some("8453"));
        assert!(matches!(params.block_number, Some(BlockParam::Number(123))));
    }
}
