//! Engine configuration.
//!
//! All tunables live here as named values and are validated once, when
//! the configuration is constructed — a cycle never re-checks them. An
//! invalid configuration refuses to run at all.

use std::time::Duration;

use thiserror::Error;

use delphi_ports::FragmentFilter;
use delphi_retrieval::{FusionConfigError, RrfConfig};

/// Tolerance when checking that the scoring weights sum to 1.0
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Fixed, named weights of the confidence blend
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub llm: f64,
    pub source_agreement: f64,
    pub indicator_strength: f64,
    pub pattern_confidence: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            llm: 0.30,
            source_agreement: 0.35,
            indicator_strength: 0.25,
            pattern_confidence: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.llm + self.source_agreement + self.indicator_strength + self.pattern_confidence
    }

    fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("llm", self.llm),
            ("source_agreement", self.source_agreement),
            ("indicator_strength", self.indicator_strength),
            ("pattern_confidence", self.pattern_confidence),
        ]
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("scoring weights must sum to 1.0, got {sum}")]
    WeightsDoNotSum { sum: f64 },

    #[error("scoring weight {name} must be within [0, 1], got {value}")]
    WeightOutOfRange { name: &'static str, value: f64 },

    #[error(transparent)]
    Fusion(#[from] FusionConfigError),

    #[error("retrieval k must be at least 1")]
    RetrievalKZero,

    #[error("max concurrency must be at least 1")]
    ConcurrencyZero,

    #[error("lookback must cover at least 2 days")]
    LookbackTooShort,
}

/// Immutable engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub weights: ScoringWeights,
    pub rrf: RrfConfig,
    /// Fragments handed to the drafter per symbol
    pub retrieval_k: usize,
    /// Days of daily price history requested per symbol
    pub lookback_days: u32,
    /// Bound on concurrently analyzed symbols — sized to respect the
    /// rate limits of the embedding index and the drafter, not local CPU
    pub max_concurrency: usize,
    /// Deadline covering query embedding plus both index searches
    pub retrieval_timeout: Duration,
    /// Deadline for the generative draft
    pub drafter_timeout: Duration,
    /// Metadata restriction applied by the knowledge index pre-fusion
    pub fragment_filter: FragmentFilter,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            rrf: RrfConfig::default(),
            retrieval_k: 5,
            lookback_days: 250,
            max_concurrency: 4,
            retrieval_timeout: Duration::from_secs(10),
            drafter_timeout: Duration::from_secs(30),
            fragment_filter: FragmentFilter::default(),
        }
    }
}

impl EngineConfig {
    /// Check every configuration invariant
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.weights.named() {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(ConfigError::WeightOutOfRange { name, value });
            }
        }
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightsDoNotSum { sum });
        }
        self.rrf.validate()?;
        if self.retrieval_k == 0 {
            return Err(ConfigError::RetrievalKZero);
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ConcurrencyZero);
        }
        if self.lookback_days < 2 {
            return Err(ConfigError::LookbackTooShort);
        }
        Ok(())
    }
}
