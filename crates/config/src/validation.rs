//! Configuration validation utilities

use crate::schema::{ChainConfig, Config};
use std::collections::HashSet;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete configuration
    pub fn validate(config: &Config) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_chains(config, &mut report);
        Self::validate_server(config, &mut report);
        Self::validate_simulation(config, &mut report);
        Self::validate_logging(config, &mut report);

        report
    }

    fn validate_chains(config: &Config, report: &mut ValidationReport) {
        if config.chains.is_empty() {
            report.add_error("chains", "At least one chain must be configured");
            return;
        }

        let mut ids = HashSet::new();
        for chain in &config.chains {
            if !ids.insert(chain.chain_id.as_str()) {
                report.add_error("chains", &format!("Duplicate chain ID: {}", chain.chain_id));
            }

            Self::validate_chain(chain, report);
        }
    }

    fn validate_chain(chain: &ChainConfig, report: &mut ValidationReport) {
        if chain.chain_id.is_empty() {
            report.add_error("chains.chain_id", "Chain ID cannot be empty");
        } else if !chain.chain_id.chars().all(|c| c.is_ascii_digit()) {
            report.add_warning(
                "chains.chain_id",
                &format!("Chain ID {} is not numeric", chain.chain_id),
            );
        }

        if chain.name.is_empty() {
            report.add_error("chains.name", &format!("Name cannot be empty for chain {}", chain.chain_id));
        }

        let rpc_url = chain.resolved_rpc_url();
        if rpc_url.is_empty() {
            report.add_error("chains.rpc_url", &format!("RPC URL cannot be empty for chain {}", chain.chain_id));
        } else if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
            report.add_error(
                "chains.rpc_url",
                &format!("RPC URL for chain {} must start with http:// or https://", chain.chain_id),
            );
        } else if rpc_url.starts_with("http://") && !rpc_url.contains("localhost") && !rpc_url.contains("127.0.0.1") {
            report.add_warning(
                "chains.rpc_url",
                &format!("RPC URL for chain {} should use HTTPS", chain.chain_id),
            );
        }

        if chain.native_currency.symbol.is_empty() {
            report.add_error(
                "chains.native_currency.symbol",
                &format!("Currency symbol cannot be empty for chain {}", chain.chain_id),
            );
        }

        if chain.native_currency.decimals > 36 {
            report.add_warning(
                "chains.native_currency.decimals",
                &format!("Unusual decimal precision for chain {}", chain.chain_id),
            );
        }
    }

    fn validate_server(config: &Config, report: &mut ValidationReport) {
        if config.server.port == 0 {
            report.add_error("server.port", "Server port cannot be 0");
        } else if config.server.port < 1024 {
            report.add_warning("server.port", "Server port is below 1024, may require elevated privileges");
        }

        if config.server.request_timeout_seconds == 0 {
            report.add_error("server.request_timeout_seconds", "Request timeout cannot be 0");
        } else if config.server.request_timeout_seconds > 300 {
            report.add_warning("server.request_timeout_seconds", "Request timeout is very high");
        }

        if config.server.max_body_size == 0 {
            report.add_error("server.max_body_size", "Max body size cannot be 0");
        } else if config.server.max_body_size > 10 * 1024 * 1024 {
            report.add_warning("server.max_body_size", "Max body size is greater than 10MB");
        }

        if config.server.host.is_empty() {
            report.add_error("server.host", "Server host cannot be empty");
        }
    }

    fn validate_simulation(config: &Config, report: &mut ValidationReport) {
        if config.simulation.timeout_seconds == 0 {
            report.add_error("simulation.timeout_seconds", "Simulation timeout cannot be 0");
        } else if config.simulation.timeout_seconds > config.server.request_timeout_seconds {
            report.add_warning(
                "simulation.timeout_seconds",
                "Simulation timeout exceeds the server request timeout and will never fire",
            );
        }

        if config.chain(&config.simulation.default_chain_id).is_none() {
            report.add_error(
                "simulation.default_chain_id",
                &format!("Default chain {} is not configured", config.simulation.default_chain_id),
            );
        }
    }

    fn validate_logging(config: &Config, report: &mut ValidationReport) {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&config.logging.level.as_str()) {
            report.add_error("logging.level", &format!("Invalid log level: {}. Valid levels: {:?}", config.logging.level, valid_levels));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&config.logging.format.as_str()) {
            report.add_error("logging.format", &format!("Invalid log format: {}. Valid formats: {:?}", config.logging.format, valid_formats));
        }

        if config.logging.level == "trace" || config.logging.level == "debug" {
            report.add_warning("logging.level", "Debug/trace logging may impact performance in production");
        }
    }
}

/// Validation report containing errors and warnings
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// First error, if any
    pub fn first_error(&self) -> Option<&ValidationIssue> {
        self.errors.first()
    }

    pub fn summary(&self) -> String {
        format!("Validation: {} errors, {} warnings", self.errors.len(), self.warnings.len())
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let report = ConfigValidator::validate(&Config::default());
        assert!(report.is_valid(), "{:?}", report.errors);
    }

    #[test]
    fn test_duplicate_chain_ids_rejected() {
        let mut config = Config::default();
        let duplicate = config.chains[0].clone();
        config.chains.push(duplicate);

        let report = ConfigValidator::validate(&config);
        assert!(report.has_errors());
        assert!(report.errors.iter().any(|e| e.message.contains("Duplicate chain ID: 1")));
    }

    #[test]
    fn test_invalid_rpc_scheme_rejected() {
        let mut config = Config::default();
        config.chains[0].rpc_url = "ftp://node.example".to_string();
        config.chains[0].rpc_url_env = None;

        let report = ConfigValidator::validate(&config);
        assert_eq!(report.first_error().map(|e| e.field.as_str()), Some("chains.rpc_url"));
    }

    #[test]
    fn test_unknown_default_chain_rejected() {
        let mut config = Config::default();
        config.simulation.default_chain_id = "999".to_string();

        let report = ConfigValidator::validate(&config);
        assert!(report.errors.iter().any(|e| e.field == "simulation.default_chain_id"));
    }

    #[test]
    fn test_plain_http_remote_endpoint_warns() {
        let mut config = Config::default();
        config.chains[0].rpc_url = "http://node.example:8545".to_string();
        config.chains[0].rpc_url_env = None;

        let report = ConfigValidator::validate(&config);
        assert!(report.is_valid());
        assert!(report.warnings.iter().any(|w| w.field == "chains.rpc_url"));
    }

    #[test]
    fn test_zero_simulation_timeout_rejected() {
        let mut config = Config::default();
        config.simulation.timeout_seconds = 0;

        let report = ConfigValidator::validate(&config);
        assert!(report.has_errors());
    }
}
