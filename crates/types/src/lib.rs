//! Shared types for the call simulator
//!
//! This crate contains the domain types used across the simulator
//! components: requests, outcomes, revert diagnoses, chain profiles
//! and the error taxonomy.

pub mod chain;
pub mod describe;
pub mod diagnosis;
pub mod error;
pub mod simulation;
pub mod utils;

// Re-export commonly used types
pub use chain::*;
pub use describe::*;
pub use diagnosis::*;
pub use error::{ConfigError, FailureCode, Result, SimulatorError};
pub use simulation::*;
