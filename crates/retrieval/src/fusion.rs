//! Reciprocal Rank Fusion.
//!
//! For each fragment at 1-indexed rank r in either source list, the fused
//! score accumulates 1/(κ + r). Fragments absent from a list contribute
//! nothing from that list. The formula is symmetric in its inputs, so the
//! fused ordering does not depend on which list is "vector" and which is
//! "lexical". Exact score ties break by fragment id lexical order to keep
//! the output independent of map iteration order.

use std::collections::HashMap;

use thiserror::Error;

use delphi_core::{FragmentId, KnowledgeFragment, RankedFragment};
use delphi_ports::ScoredFragment;

/// Default RRF rank constant (κ)
pub const DEFAULT_RANK_CONSTANT: f64 = 60.0;
/// Default per-source overfetch factor before fusion
pub const DEFAULT_CANDIDATE_MULTIPLIER: usize = 2;

/// Fusion parameters — named configuration, not literals
#[derive(Debug, Clone, PartialEq)]
pub struct RrfConfig {
    /// κ in 1/(κ + rank); must be positive
    pub rank_constant: f64,
    /// Each source is asked for `k × candidate_multiplier` fragments so
    /// fusion sees a wider pool than it returns; must be at least 1
    pub candidate_multiplier: usize,
}

impl Default for RrfConfig {
    fn default() -> Self {
        Self {
            rank_constant: DEFAULT_RANK_CONSTANT,
            candidate_multiplier: DEFAULT_CANDIDATE_MULTIPLIER,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FusionConfigError {
    #[error("RRF rank constant must be positive, got {0}")]
    RankConstantNotPositive(f64),

    #[error("candidate multiplier must be at least 1")]
    CandidateMultiplierZero,
}

impl RrfConfig {
    /// Check the fusion invariants; called at configuration load, never
    /// per retrieval
    pub fn validate(&self) -> Result<(), FusionConfigError> {
        if !(self.rank_constant > 0.0) {
            return Err(FusionConfigError::RankConstantNotPositive(
                self.rank_constant,
            ));
        }
        if self.candidate_multiplier == 0 {
            return Err(FusionConfigError::CandidateMultiplierZero);
        }
        Ok(())
    }
}

/// Fuse two source rankings into one deduplicated, deterministically
/// ordered ranking
///
/// The result covers every fragment seen in either list, fused score
/// non-increasing; the caller truncates to its k.
pub fn fuse(
    vector: &[ScoredFragment],
    lexical: &[ScoredFragment],
    config: &RrfConfig,
) -> Vec<RankedFragment> {
    let mut fused: HashMap<FragmentId, (f64, &KnowledgeFragment)> = HashMap::new();

    for ranking in [vector, lexical] {
        for (index, hit) in ranking.iter().enumerate() {
            let rank = (index + 1) as f64;
            let contribution = 1.0 / (config.rank_constant + rank);
            fused
                .entry(hit.fragment.id.clone())
                .and_modify(|(score, _)| *score += contribution)
                .or_insert((contribution, &hit.fragment));
        }
    }

    let mut ranked: Vec<RankedFragment> = fused
        .into_values()
        .map(|(score, fragment)| RankedFragment {
            fragment: fragment.clone(),
            score,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.fragment.id.cmp(&b.fragment.id))
    });

    ranked
}
