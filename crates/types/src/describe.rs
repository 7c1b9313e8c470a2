//! Capability discovery payload

use crate::chain::ChainSummary;
use serde::{Deserialize, Serialize};

/// Description of the service returned by `describe`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDescription {
    pub name: String,
    pub version: String,
    pub description: String,
    pub capabilities: Vec<String>,
    #[serde(rename = "supportedChains")]
    pub supported_chains: Vec<ChainSummary>,
    pub methods: Vec<MethodDescription>,
}

/// One callable method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDescription {
    pub name: String,
    pub description: String,
    pub parameters: Vec<String>,
}
