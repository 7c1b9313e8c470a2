//! Transaction dry-run simulation and revert diagnosis
//!
//! This crate resolves chains, keeps one node connection per chain,
//! runs calls without committing state and explains why a call would
//! revert.

pub mod cache;
pub mod engine;
pub mod node;
pub mod node_error;
pub mod registry;
pub mod revert;
pub mod traits;

pub use cache::ConnectionCache;
pub use engine::Simulator;
pub use node::{AlloyNodeClient, HttpConnector};
pub use node_error::{NodeError, CALL_EXCEPTION_CODE};
pub use registry::ChainRegistry;
pub use revert::{diagnose, is_revert_failure};
pub use traits::*;
