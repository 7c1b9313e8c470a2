//! Node access traits and interfaces

use crate::node_error::NodeError;
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use types::{ChainProfile, Result, SimulationRequest};

/// Call tuple sent to the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: Address,
    pub data: Bytes,
    pub from: Address,
    pub value: U256,
}

impl From<&SimulationRequest> for CallRequest {
    fn from(request: &SimulationRequest) -> Self {
        Self {
            to: request.to,
            data: request.data.clone(),
            from: request.caller(),
            value: request.call_value(),
        }
    }
}

/// Read-only access to a chain's JSON-RPC node
#[async_trait]
pub trait NodeClient: Send + Sync + Debug {
    /// Current block height
    async fn block_number(&self) -> std::result::Result<u64, NodeError>;

    /// Gas the node expects the call to consume
    async fn estimate_gas(&self, call: &CallRequest) -> std::result::Result<u64, NodeError>;

    /// Execute the call without committing state
    async fn call(
        &self,
        call: &CallRequest,
        block: BlockNumberOrTag,
    ) -> std::result::Result<Bytes, NodeError>;

    /// Native balance of an account at the latest block
    async fn balance(&self, address: Address) -> std::result::Result<U256, NodeError>;

    /// Endpoint the client talks to, for logging
    fn endpoint(&self) -> &str;
}

/// Shared handle to a node connection
pub type ConnectionHandle = Arc<dyn NodeClient>;

/// Trait for opening node connections from chain profiles
pub trait NodeConnector: Send + Sync + Debug {
    /// Open a connection to the profile's endpoint
    fn connect(&self, profile: &ChainProfile) -> Result<ConnectionHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_request_applies_defaults() {
        let request = SimulationRequest::new(Address::repeat_byte(0xaa), Bytes::from(vec![0x70, 0xa0, 0x82, 0x31]));
        let call = CallRequest::from(&request);

        assert_eq!(call.to, Address::repeat_byte(0xaa));
        assert_eq!(call.from, Address::ZERO);
        assert_eq!(call.value, U256::ZERO);
        assert_eq!(call.data.len(), 4);
    }

    #[test]
    fn test_call_request_keeps_explicit_fields() {
        let request = SimulationRequest::new(Address::repeat_byte(0xaa), Bytes::new())
            .with_from(Address::repeat_byte(0xbb))
            .with_value(U256::from(1_000u64));
        let call = CallRequest::from(&request);

        assert_eq!(call.from, Address::repeat_byte(0xbb));
        assert_eq!(call.value, U256::from(1_000u64));
    }
}
