//! Error types for the call simulator

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for the call simulator.
///
/// On-chain reverts are not errors: they are reported as a failed
/// [`SimulationOutcome`](crate::SimulationOutcome). Only problems that
/// prevent a simulation from running at all end up here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulatorError {
    /// Requested chain identifier has no registered profile
    #[error("Unsupported chain ID: {chain_id}")]
    ChainNotSupported { chain_id: String },

    /// Unexpected infrastructure failure (node unreachable, bad profile, timeout)
    #[error("{code} on chain {chain_id}: {message}")]
    SimulationFailure {
        code: FailureCode,
        chain_id: String,
        message: String,
    },

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Machine-readable code attached to a [`SimulatorError::SimulationFailure`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureCode {
    /// Generic failure while driving a simulation
    SimulationError,
    /// Node connection could not be constructed
    ConnectionError,
    /// Block height probe failed
    BlockNumberError,
    /// Balance probe failed
    BalanceError,
    /// The external deadline elapsed
    Timeout,
}

impl FailureCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureCode::SimulationError => "SIMULATION_ERROR",
            FailureCode::ConnectionError => "CONNECTION_ERROR",
            FailureCode::BlockNumberError => "BLOCK_NUMBER_ERROR",
            FailureCode::BalanceError => "BALANCE_ERROR",
            FailureCode::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SimulatorError {
    /// Build a simulation failure with the given code
    pub fn failure(code: FailureCode, chain_id: impl Into<String>, message: impl Into<String>) -> Self {
        SimulatorError::SimulationFailure {
            code,
            chain_id: chain_id.into(),
            message: message.into(),
        }
    }

    /// Machine-readable code for any error variant
    pub fn code(&self) -> &'static str {
        match self {
            SimulatorError::ChainNotSupported { .. } => "CHAIN_NOT_SUPPORTED",
            SimulatorError::SimulationFailure { code, .. } => code.as_str(),
            SimulatorError::Config(_) => "CONFIG_ERROR",
            SimulatorError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Chain identifier the error relates to, if any
    pub fn chain_id(&self) -> Option<&str> {
        match self {
            SimulatorError::ChainNotSupported { chain_id } => Some(chain_id),
            SimulatorError::SimulationFailure { chain_id, .. } => Some(chain_id),
            _ => None,
        }
    }
}

/// Configuration specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Validation error
    #[error("Configuration validation error: {field}: {message}")]
    ValidationError { field: String, message: String },
}

impl From<ConfigError> for SimulatorError {
    fn from(err: ConfigError) -> Self {
        SimulatorError::Config(err.to_string())
    }
}
