//! Simulation orchestrator

use crate::cache::ConnectionCache;
use crate::node::HttpConnector;
use crate::registry::ChainRegistry;
use crate::revert::{diagnose, is_revert_failure};
use crate::traits::{CallRequest, NodeConnector};
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use types::{
    FailureCode, MethodDescription, Result, ServiceDescription, SimulationOutcome,
    SimulationRequest, SimulatorError,
};

/// Drives dry runs against the configured chains
#[derive(Debug)]
pub struct Simulator {
    registry: Arc<ChainRegistry>,
    connections: ConnectionCache,
}

impl Simulator {
    pub fn new(registry: ChainRegistry, connector: Arc<dyn NodeConnector>) -> Self {
        let registry = Arc::new(registry);
        Self {
            connections: ConnectionCache::new(registry.clone(), connector),
            registry,
        }
    }

    /// Simulator talking to real nodes over HTTP
    pub fn with_http(registry: ChainRegistry) -> Self {
        Self::new(registry, Arc::new(HttpConnector))
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn connections(&self) -> &ConnectionCache {
        &self.connections
    }

    /// Dry-run a call.
    ///
    /// Reverts come back as [`SimulationOutcome::Failure`]. Only an unknown
    /// chain or an unreachable node is reported as an error.
    #[instrument(skip_all, fields(chain_id = %request.chain_id, to = %request.to))]
    pub async fn simulate(&self, request: &SimulationRequest) -> Result<SimulationOutcome> {
        let profile = self.registry.resolve(&request.chain_id)?;
        let node = self.connections.acquire(&request.chain_id).await?;

        let block_number = node.block_number().await.map_err(|e| {
            error!(error = %e, "Simulation failed with unexpected error");
            SimulatorError::failure(
                FailureCode::SimulationError,
                &request.chain_id,
                format!("Simulation failed: {}", e),
            )
        })?;

        info!(
            chain = %profile.name,
            from = %request.caller(),
            value = %request.call_value(),
            block = ?request.block(),
            data_len = request.data.len(),
            block_number,
            "Simulating transaction"
        );

        let call = CallRequest::from(request);

        let gas_estimate = match node.estimate_gas(&call).await {
            Ok(gas) => {
                debug!(gas_estimate = gas, "Gas estimation successful");
                Some(gas)
            }
            Err(e) => {
                warn!(error = %e, "Gas estimation failed, executing call anyway");
                None
            }
        };

        match node.call(&call, request.block()).await {
            Ok(return_data) => {
                info!(
                    gas_estimate,
                    return_len = return_data.len(),
                    "Simulation succeeded"
                );
                Ok(SimulationOutcome::success(
                    gas_estimate,
                    return_data,
                    block_number,
                    &request.chain_id,
                ))
            }
            Err(e) => {
                let revert = diagnose(&e);
                info!(
                    reason = %revert.reason,
                    is_revert = is_revert_failure(&e),
                    decoded = revert.diagnosis.as_ref().map(|d| d.kind()),
                    "Simulation reverted"
                );
                Ok(SimulationOutcome::failure(
                    revert,
                    gas_estimate,
                    block_number,
                    &request.chain_id,
                ))
            }
        }
    }

    /// Current block height of a chain
    #[instrument(skip(self))]
    pub async fn block_number(&self, chain_id: &str) -> Result<u64> {
        let node = self.connections.acquire(chain_id).await?;
        node.block_number().await.map_err(|e| {
            error!(error = %e, "Failed to get block number");
            SimulatorError::failure(
                FailureCode::BlockNumberError,
                chain_id,
                format!("Failed to get block number: {}", e),
            )
        })
    }

    /// Native balance of `address` at the latest block
    #[instrument(skip(self))]
    pub async fn balance(&self, address: Address, chain_id: &str) -> Result<U256> {
        let node = self.connections.acquire(chain_id).await?;
        node.balance(address).await.map_err(|e| {
            error!(error = %e, "Failed to get balance");
            SimulatorError::failure(
                FailureCode::BalanceError,
                chain_id,
                format!("Failed to get balance: {}", e),
            )
        })
    }

    /// Capability discovery payload
    pub fn describe(&self) -> ServiceDescription {
        ServiceDescription {
            name: "callsim".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Transaction dry-run simulation and revert diagnosis for EVM chains"
                .to_string(),
            capabilities: [
                "Simulate EVM-compatible transactions",
                "Estimate gas costs",
                "Decode revert reasons",
                "Multi-chain support",
                "Safe dry-run execution",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            supported_chains: self.registry.describe(),
            methods: vec![
                MethodDescription {
                    name: "simulate".to_string(),
                    description: "Simulates a transaction and returns success/failure status, gas estimate, and decoded results".to_string(),
                    parameters: [
                        "to: Contract address (required)",
                        "data: Encoded function call (required)",
                        "from: Sender address (optional)",
                        "value: Native amount in wei, hex encoded (optional)",
                        "chainId: Target chain (optional, default: 1)",
                        "blockNumber: Block to simulate at (optional, default: latest)",
                    ]
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
                },
                MethodDescription {
                    name: "describe".to_string(),
                    description: "Returns information about the simulator and supported chains"
                        .to_string(),
                    parameters: Vec::new(),
                },
                MethodDescription {
                    name: "blockNumber".to_string(),
                    description: "Returns the current block height of a chain".to_string(),
                    parameters: vec!["chainId: Target chain (required)".to_string()],
                },
                MethodDescription {
                    name: "balance".to_string(),
                    description: "Returns the native balance of an address in wei".to_string(),
                    parameters: vec![
                        "address: Account address (required)".to_string(),
                        "chainId: Target chain (required)".to_string(),
                    ],
                },
            ],
        }
    }
}
