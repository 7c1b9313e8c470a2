//! Chain registry

use types::{ChainProfile, ChainSummary, Result, SimulatorError};

/// Read-only table of supported chains, in configuration order
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    profiles: Vec<ChainProfile>,
}

impl ChainRegistry {
    /// Build a registry; on duplicate identifiers the first entry wins
    pub fn new(profiles: Vec<ChainProfile>) -> Self {
        let mut unique: Vec<ChainProfile> = Vec::with_capacity(profiles.len());
        for profile in profiles {
            if !unique.iter().any(|p| p.chain_id == profile.chain_id) {
                unique.push(profile);
            }
        }
        Self { profiles: unique }
    }

    /// Profile registered for `chain_id`
    pub fn resolve(&self, chain_id: &str) -> Result<&ChainProfile> {
        self.profiles
            .iter()
            .find(|p| p.chain_id == chain_id)
            .ok_or_else(|| SimulatorError::ChainNotSupported {
                chain_id: chain_id.to_string(),
            })
    }

    pub fn supported_chain_ids(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.chain_id.as_str()).collect()
    }

    /// Public summaries of every chain
    pub fn describe(&self) -> Vec<ChainSummary> {
        self.profiles.iter().map(ChainProfile::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
