//! Simulation request and outcome types

use crate::diagnosis::{RevertDiagnosis, RevertReason};
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Chain used when a request does not name one
pub const DEFAULT_CHAIN_ID: &str = "1";

/// A validated dry-run request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Contract to call
    pub to: Address,
    /// Call payload, may be empty
    pub data: Bytes,
    /// Caller; the zero address is used when absent
    pub from: Option<Address>,
    /// Native value sent with the call; zero when absent
    pub value: Option<U256>,
    /// Chain identifier
    #[serde(rename = "chainId", default = "default_chain_id")]
    pub chain_id: String,
    /// Block to execute the call against; `latest` when absent
    #[serde(rename = "blockNumber")]
    pub block_number: Option<BlockNumberOrTag>,
}

fn default_chain_id() -> String {
    DEFAULT_CHAIN_ID.to_string()
}

impl SimulationRequest {
    /// Create a request for `to` with `data` on the default chain
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            data: data.into(),
            from: None,
            value: None,
            chain_id: default_chain_id(),
            block_number: None,
        }
    }

    pub fn with_from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_chain_id(mut self, chain_id: impl Into<String>) -> Self {
        self.chain_id = chain_id.into();
        self
    }

    pub fn with_block(mut self, block: BlockNumberOrTag) -> Self {
        self.block_number = Some(block);
        self
    }

    /// Effective caller address
    pub fn caller(&self) -> Address {
        self.from.unwrap_or(Address::ZERO)
    }

    /// Effective call value
    pub fn call_value(&self) -> U256 {
        self.value.unwrap_or(U256::ZERO)
    }

    /// Effective block tag
    pub fn block(&self) -> BlockNumberOrTag {
        self.block_number.unwrap_or(BlockNumberOrTag::Latest)
    }
}

/// The call would succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSuccess {
    #[serde(rename = "wouldSucceed")]
    pub would_succeed: bool,
    /// Node gas estimate; absent when estimation failed
    #[serde(rename = "gasEstimate")]
    pub gas_estimate: Option<u64>,
    #[serde(rename = "returnData")]
    pub return_data: Bytes,
    /// Block height observed when the simulation started
    #[serde(rename = "blockNumber")]
    pub block_number: u64,
    #[serde(rename = "chainId")]
    pub chain_id: String,
}

/// The call would revert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationFailed {
    #[serde(rename = "wouldSucceed")]
    pub would_succeed: bool,
    pub reason: String,
    #[serde(rename = "revertData", skip_serializing_if = "Option::is_none")]
    pub revert_data: Option<Bytes>,
    #[serde(rename = "decodedError", skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<RevertDiagnosis>,
    /// Only present when the estimate was non-zero
    #[serde(rename = "gasEstimate", skip_serializing_if = "Option::is_none")]
    pub gas_estimate: Option<u64>,
    #[serde(rename = "blockNumber")]
    pub block_number: u64,
    #[serde(rename = "chainId")]
    pub chain_id: String,
}

/// Result of a dry run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum SimulationOutcome {
    #[serde(rename = "success")]
    Success(SimulationSuccess),
    #[serde(rename = "error")]
    Failure(SimulationFailed),
}

impl SimulationOutcome {
    /// Build a success outcome
    pub fn success(
        gas_estimate: Option<u64>,
        return_data: Bytes,
        block_number: u64,
        chain_id: impl Into<String>,
    ) -> Self {
        SimulationOutcome::Success(SimulationSuccess {
            would_succeed: true,
            gas_estimate,
            return_data,
            block_number,
            chain_id: chain_id.into(),
        })
    }

    /// Build a failure outcome from a diagnosed revert.
    ///
    /// An estimate of exactly zero means "unknown" and is dropped.
    pub fn failure(
        revert: RevertReason,
        gas_estimate: Option<u64>,
        block_number: u64,
        chain_id: impl Into<String>,
    ) -> Self {
        SimulationOutcome::Failure(SimulationFailed {
            would_succeed: false,
            reason: revert.reason,
            revert_data: revert.revert_data,
            diagnosis: revert.diagnosis,
            gas_estimate: gas_estimate.filter(|gas| *gas > 0),
            block_number,
            chain_id: chain_id.into(),
        })
    }

    pub fn would_succeed(&self) -> bool {
        matches!(self, SimulationOutcome::Success(_))
    }

    pub fn block_number(&self) -> u64 {
        match self {
            SimulationOutcome::Success(s) => s.block_number,
            SimulationOutcome::Failure(f) => f.block_number,
        }
    }

    pub fn chain_id(&self) -> &str {
        match self {
            SimulationOutcome::Success(s) => &s.chain_id,
            SimulationOutcome::Failure(f) => &f.chain_id,
        }
    }

    pub fn gas_estimate(&self) -> Option<u64> {
        match self {
            SimulationOutcome::Success(s) => s.gas_estimate,
            SimulationOutcome::Failure(f) => f.gas_estimate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request = SimulationRequest::new(Address::repeat_byte(0x11), Bytes::new());
        assert_eq!(request.chain_id, "1");
        assert_eq!(request.caller(), Address::ZERO);
        assert_eq!(request.call_value(), U256::ZERO);
        assert_eq!(request.block(), BlockNumberOrTag::Latest);
    }

    #[test]
    fn test_failure_drops_zero_gas_estimate() {
        let revert = RevertReason {
            reason: "Nonce too low".to_string(),
            revert_data: None,
            diagnosis: None,
        };
        let outcome = SimulationOutcome::failure(revert.clone(), Some(0), 100, "1");
        assert_eq!(outcome.gas_estimate(), None);

        let outcome = SimulationOutcome::failure(revert, Some(21_000), 100, "1");
        assert_eq!(outcome.gas_estimate(), Some(21_000));
    }

    #[test]
    fn test_outcome_status_tag() {
        let outcome = SimulationOutcome::success(Some(21_000), Bytes::from(vec![0x01]), 42, "1");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["wouldSucceed"], true);
        assert_eq!(json["returnData"], "0x01");
        assert_eq!(json["blockNumber"], 42);
    }
}
