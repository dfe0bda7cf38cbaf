//! TierLadder: configured granularity tiers ordered finest → coarsest.

use serde::{Deserialize, Serialize};

use crate::config::TierSpec;
use crate::errors::{ConfigError, GranulaResult};

use super::TierId;

/// Tiers sorted by chunk size. "Finer" means the next smaller chunk size,
/// "coarser" the next larger one. Moving past either end stays on that end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLadder {
    tiers: Vec<TierSpec>,
}

impl TierLadder {
    /// Build a ladder from config specs. Fails on an empty list.
    pub fn new(specs: &[TierSpec]) -> GranulaResult<Self> {
        if specs.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "granularity.tiers".to_string(),
                message: "at least one tier is required".to_string(),
            }
            .into());
        }
        let mut tiers = specs.to_vec();
        tiers.sort_by_key(|t| t.chunk_size);
        Ok(Self { tiers })
    }

    /// Tier ids, finest first.
    pub fn ids(&self) -> impl Iterator<Item = TierId> + '_ {
        self.tiers.iter().map(|t| TierId::new(t.id.clone()))
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn contains(&self, tier: &TierId) -> bool {
        self.position(tier).is_some()
    }

    /// Index of `tier` on the ladder (0 = finest).
    pub fn position(&self, tier: &TierId) -> Option<usize> {
        self.tiers.iter().position(|t| t.id == tier.as_str())
    }

    pub fn chunk_size(&self, tier: &TierId) -> Option<u32> {
        self.position(tier).map(|i| self.tiers[i].chunk_size)
    }

    pub fn at(&self, index: usize) -> Option<TierId> {
        self.tiers.get(index).map(|t| TierId::new(t.id.clone()))
    }

    pub fn finest(&self) -> TierId {
        TierId::new(self.tiers[0].id.clone())
    }

    pub fn coarsest(&self) -> TierId {
        TierId::new(self.tiers[self.tiers.len() - 1].id.clone())
    }

    /// Middle tier; the lower middle when the count is even.
    pub fn medium(&self) -> TierId {
        TierId::new(self.tiers[(self.tiers.len() - 1) / 2].id.clone())
    }

    /// Next smaller chunk size, or `tier` itself at the fine end.
    /// Unknown tiers are returned unchanged.
    pub fn finer(&self, tier: &TierId) -> TierId {
        match self.position(tier) {
            Some(i) if i > 0 => TierId::new(self.tiers[i - 1].id.clone()),
            _ => tier.clone(),
        }
    }

    /// Next larger chunk size, or `tier` itself at the coarse end.
    /// Unknown tiers are returned unchanged.
    pub fn coarser(&self, tier: &TierId) -> TierId {
        match self.position(tier) {
            Some(i) if i + 1 < self.tiers.len() => TierId::new(self.tiers[i + 1].id.clone()),
            _ => tier.clone(),
        }
    }

    /// Every tier except `tier`, finest first.
    pub fn others<'a>(&'a self, tier: &'a TierId) -> impl Iterator<Item = TierId> + 'a {
        self.ids().filter(move |t| t != tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier_spec(id: &str, chunk_size: u32) -> TierSpec {
        TierSpec {
            id: id.to_string(),
            chunk_size,
        }
    }

    fn ladder() -> TierLadder {
        // Deliberately unsorted input.
        TierLadder::new(&[tier_spec("coarse", 1024), tier_spec("fine", 256), tier_spec("medium", 512)]).unwrap()
    }

    #[test]
    fn sorts_by_chunk_size() {
        let ids: Vec<_> = ladder().ids().map(|t| t.to_string()).collect();
        assert_eq!(ids, vec!["fine", "medium", "coarse"]);
    }

    #[test]
    fn neighbors_move_one_step() {
        let l = ladder();
        assert_eq!(l.coarser(&"medium".into()), TierId::from("coarse"));
        assert_eq!(l.finer(&"medium".into()), TierId::from("fine"));
    }

    #[test]
    fn extremes_are_sticky() {
        let l = ladder();
        assert_eq!(l.coarser(&"coarse".into()), TierId::from("coarse"));
        assert_eq!(l.finer(&"fine".into()), TierId::from("fine"));
    }

    #[test]
    fn medium_of_even_ladder_is_lower_middle() {
        let l = TierLadder::new(&[
            tier_spec("a", 128),
            tier_spec("b", 256),
            tier_spec("c", 512),
            tier_spec("d", 1024),
        ])
        .unwrap();
        assert_eq!(l.medium(), TierId::from("b"));
    }

    #[test]
    fn empty_ladder_is_rejected() {
        assert!(TierLadder::new(&[]).is_err());
    }
}
