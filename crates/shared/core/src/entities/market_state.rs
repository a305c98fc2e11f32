use serde::{Deserialize, Serialize};

use super::{IndicatorSet, Pattern};
use crate::values::Symbol;

/// Normalized market context for one symbol in one analysis cycle
///
/// The unit of context passed into retrieval query construction and
/// scoring. Change and volume are expressed as a signed percentage and a
/// multiple of average volume so downstream consumers treat all symbols
/// uniformly regardless of absolute price scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    pub symbol: Symbol,
    /// Last close
    pub price: f64,
    /// One-day close-to-close change, signed percent
    pub price_change_1d: f64,
    /// Last volume as a multiple of the trailing average volume;
    /// absent when the volume history is degenerate (all-zero baseline)
    pub volume_ratio: Option<f64>,
    pub indicators: IndicatorSet,
    pub patterns: Vec<Pattern>,
    /// External news sentiment in [-1, 1], when a provider supplied one
    pub news_sentiment: Option<f64>,
}

impl MarketState {
    /// Strongest detected pattern, if any
    pub fn strongest_pattern(&self) -> Option<&Pattern> {
        self.patterns
            .iter()
            .max_by(|a, b| a.strength.value().total_cmp(&b.strength.value()))
    }
}
