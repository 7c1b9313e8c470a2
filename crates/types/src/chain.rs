//! Chain profile types

use serde::{Deserialize, Serialize};

/// Native currency metadata of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name (e.g. "Ether")
    pub name: String,
    /// Ticker symbol (e.g. "ETH")
    pub symbol: String,
    /// Decimal precision
    pub decimals: u8,
}

/// Connection profile of a supported chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainProfile {
    /// Chain identifier, as used in requests
    #[serde(rename = "chainId")]
    pub chain_id: String,
    /// Display name
    pub name: String,
    /// JSON-RPC endpoint URL
    #[serde(rename = "rpcUrl")]
    pub rpc_url: String,
    /// Native currency
    #[serde(rename = "nativeCurrency")]
    pub native_currency: NativeCurrency,
}

/// Public view of a chain, without its endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "nativeCurrency")]
    pub native_currency: NativeCurrency,
}

impl NativeCurrency {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }
}

impl ChainProfile {
    /// Summary safe to expose to callers (the endpoint may embed an API key)
    pub fn summary(&self) -> ChainSummary {
        ChainSummary {
            id: self.chain_id.clone(),
            name: self.name.clone(),
            native_currency: self.native_currency.clone(),
        }
    }
}
