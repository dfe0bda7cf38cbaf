use serde::{Deserialize, Serialize};

use super::defaults;

/// One configured retrieval granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpec {
    pub id: String,
    /// Chunk size the retrieval index for this tier was built with.
    pub chunk_size: u32,
}

/// Granularity subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GranularityConfig {
    /// Available tiers, in any order. Neighbors are derived from `chunk_size`.
    pub tiers: Vec<TierSpec>,
    /// Tier for the first attempt. `None` lets the analyzer decide.
    pub initial_tier: Option<String>,
    /// Technical acronyms counted towards the domain-specificity score.
    pub acronyms: Vec<String>,
}

impl Default for GranularityConfig {
    fn default() -> Self {
        Self {
            tiers: defaults::DEFAULT_TIERS
                .iter()
                .map(|(id, chunk_size)| TierSpec {
                    id: (*id).to_string(),
                    chunk_size: *chunk_size,
                })
                .collect(),
            initial_tier: None,
            acronyms: defaults::DEFAULT_ACRONYMS
                .iter()
                .map(|a| (*a).to_string())
                .collect(),
        }
    }
}
