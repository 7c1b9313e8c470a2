//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use types::{ChainProfile, NativeCurrency};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Supported chains, in the order they are advertised
    #[serde(default = "default_chains")]
    pub chains: Vec<ChainConfig>,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Simulation behaviour
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One supported chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain identifier used in requests
    pub chain_id: String,
    /// Display name
    pub name: String,
    /// Fallback JSON-RPC endpoint
    pub rpc_url: String,
    /// Environment variable that overrides `rpc_url` when set
    #[serde(default)]
    pub rpc_url_env: Option<String>,
    /// Native currency
    pub native_currency: NativeCurrency,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

/// Simulation behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Chain used when a request omits `chainId`
    #[serde(default = "default_chain_id")]
    pub default_chain_id: String,
    /// Deadline for one complete simulation (block height, estimate and call)
    #[serde(default = "default_simulation_timeout")]
    pub timeout_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    256 * 1024 // 256KB
}

fn default_chain_id() -> String {
    types::DEFAULT_CHAIN_ID.to_string()
}

fn default_simulation_timeout() -> u64 {
    20
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn chain(
    chain_id: &str,
    name: &str,
    rpc_url: &str,
    rpc_url_env: &str,
    currency: (&str, &str),
) -> ChainConfig {
    ChainConfig {
        chain_id: chain_id.to_string(),
        name: name.to_string(),
        rpc_url: rpc_url.to_string(),
        rpc_url_env: Some(rpc_url_env.to_string()),
        native_currency: NativeCurrency::new(currency.0, currency.1, 18),
    }
}

/// Built-in chain table with public fallback endpoints
pub fn default_chains() -> Vec<ChainConfig> {
    vec![
        chain("1", "Ethereum Mainnet", "https://eth.llamarpc.com", "ETHEREUM_RPC_URL", ("Ether", "ETH")),
        chain("137", "Polygon", "https://polygon.llamarpc.com", "POLYGON_RPC_URL", ("MATIC", "MATIC")),
        chain("42161", "Arbitrum One", "https://arb1.arbitrum.io/rpc", "ARBITRUM_RPC_URL", ("Ether", "ETH")),
        chain("56", "BNB Smart Chain", "https://bsc-dataseed.binance.org/", "BSC_RPC_URL", ("BNB", "BNB")),
        chain("10", "Optimism", "https://mainnet.optimism.io", "OPTIMISM_RPC_URL", ("Ether", "ETH")),
        chain("8453", "Base", "https://mainnet.base.org", "BASE_RPC_URL", ("Ether", "ETH")),
    ]
}

impl ChainConfig {
    /// Endpoint after applying the environment override, if any
    pub fn resolved_rpc_url(&self) -> String {
        self.rpc_url_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.rpc_url.clone())
    }

    /// Whether the environment override is in effect
    pub fn is_overridden(&self) -> bool {
        self.resolved_rpc_url() != self.rpc_url
    }

    /// Convert to the profile consumed by the chain registry
    pub fn to_profile(&self) -> ChainProfile {
        ChainProfile {
            chain_id: self.chain_id.clone(),
            name: self.name.clone(),
            rpc_url: self.resolved_rpc_url(),
            native_currency: self.native_currency.clone(),
        }
    }
}

impl Config {
    /// Chain profiles in table order, with environment overrides applied
    pub fn chain_profiles(&self) -> Vec<ChainProfile> {
        self.chains.iter().map(ChainConfig::to_profile).collect()
    }

    /// Look up a configured chain
    pub fn chain(&self, chain_id: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chains: default_chains(),
            server: ServerConfig::default(),
            simulation: SimulationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            max_body_size: default_max_body_size(),
            cors_enabled: default_true(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            default_chain_id: default_chain_id(),
            timeout_seconds: default_simulation_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_table_order() {
        let ids: Vec<_> = default_chains().into_iter().map(|c| c.chain_id).collect();
        assert_eq!(ids, vec!["1", "137", "42161", "56", "10", "8453"]);
    }

    #[test]
    fn test_profile_uses_fallback_without_override() {
        let mut chain = default_chains().remove(1);
        chain.rpc_url_env = Some("CALLSIM_TEST_UNSET_POLYGON_URL".to_string());
        let profile = chain.to_profile();
        assert_eq!(profile.rpc_url, "https://polygon.llamarpc.com");
        assert_eq!(profile.native_currency.symbol, "MATIC");
        assert!(!chain.is_overridden());
    }

    #[test]
    fn test_profile_applies_env_override() {
        let mut chain = default_chains().remove(0);
        chain.rpc_url_env = Some("CALLSIM_TEST_SCHEMA_OVERRIDE_URL".to_string());
        std::env::set_var("CALLSIM_TEST_SCHEMA_OVERRIDE_URL", "http://localhost:8545");
        assert_eq!(chain.to_profile().rpc_url, "http://localhost:8545");
        assert!(chain.is_overridden());
        std::env::remove_var("CALLSIM_TEST_SCHEMA_OVERRIDE_URL");
    }

    #[test]
    fn test_blank_env_override_is_ignored() {
        let mut chain = default_chains().remove(0);
        chain.rpc_url_env = Some("CALLSIM_TEST_SCHEMA_BLANK_URL".to_string());
        std::env::set_var("CALLSIM_TEST_SCHEMA_BLANK_URL", "  ");
        assert_eq!(chain.resolved_rpc_url(), "https://eth.llamarpc.com");
        std::env::remove_var("CALLSIM_TEST_SCHEMA_BLANK_URL");
    }
}
