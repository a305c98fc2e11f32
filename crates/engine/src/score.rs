//! Confidence scoring.
//!
//! Blends four ingredients into one bounded score: the drafter's
//! self-reported confidence, agreement among cited sources, indicator
//! confluence, and detected-pattern strength. The blend is a weighted sum
//! with weights validated at configuration load; the result is clamped
//! into [0, 100] by construction of [`Confidence`].

use delphi_core::{Citation, Confidence, IndicatorSet, MarketState, SignalAction};

use crate::config::ScoringWeights;

/// Points per citation in the source-agreement component
const SOURCE_CITATION_WEIGHT: f64 = 15.0;
/// Points for full source diversity in the source-agreement component
const SOURCE_DIVERSITY_WEIGHT: f64 = 20.0;

/// Weighted-sum confidence scorer
///
/// Holds validated weights; construction happens once per engine, not
/// per call.
#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    weights: ScoringWeights,
}

impl ConfidenceScorer {
    /// `weights` must come from a validated [`EngineConfig`]
    ///
    /// [`EngineConfig`]: crate::config::EngineConfig
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Blend the components into a final bounded confidence
    ///
    /// `indicator_strength` is the caller-supplied pre-aggregated
    /// confluence in [0, 100] (see [`confluence`]).
    pub fn score(
        &self,
        llm_confidence: f64,
        citations: &[Citation],
        indicator_strength: f64,
        market_state: &MarketState,
    ) -> Confidence {
        let blended = self.weights.llm * llm_confidence
            + self.weights.source_agreement * source_agreement(citations)
            + self.weights.indicator_strength * indicator_strength
            + self.weights.pattern_confidence * pattern_confidence(market_state);
        Confidence::new(blended)
    }
}

/// Citation count and diversity folded into [0, 100]
///
/// `min(100, 15·total + 20·(distinct/total))`, 0 without citations.
pub fn source_agreement(citations: &[Citation]) -> f64 {
    let total = citations.len();
    if total == 0 {
        return 0.0;
    }

    let mut titles: Vec<&str> = citations
        .iter()
        .map(|citation| citation.source_title.as_str())
        .collect();
    titles.sort_unstable();
    titles.dedup();
    let distinct = titles.len();

    let raw = SOURCE_CITATION_WEIGHT * total as f64
        + SOURCE_DIVERSITY_WEIGHT * (distinct as f64 / total as f64);
    raw.min(100.0)
}

/// Strongest detected pattern scaled to [0, 100]; 0 when none
pub fn pattern_confidence(market_state: &MarketState) -> f64 {
    market_state
        .strongest_pattern()
        .map(|pattern| pattern.strength.value() * 100.0)
        .unwrap_or(0.0)
}

/// Fraction of present directional indicators agreeing with the action,
/// scaled to [0, 100]
///
/// Each present indicator casts one bullish-or-bearish vote; absent
/// indicators abstain. A HOLD action has no direction to agree with, and
/// a set with no votes scores 0.
pub fn confluence(action: SignalAction, market_state: &MarketState) -> f64 {
    if !action.is_directional() {
        return 0.0;
    }

    let votes = directional_votes(&market_state.indicators, market_state.price);
    if votes.is_empty() {
        return 0.0;
    }

    let bullish = votes.iter().filter(|vote| **vote).count();
    let agreeing = match action {
        SignalAction::Buy => bullish,
        SignalAction::Sell => votes.len() - bullish,
        SignalAction::Hold => 0,
    };
    agreeing as f64 / votes.len() as f64 * 100.0
}

/// One bool per present indicator: true = bullish
fn directional_votes(indicators: &IndicatorSet, price: f64) -> Vec<bool> {
    let mut votes = Vec::new();
    if let Some(rsi) = indicators.rsi14 {
        votes.push(rsi > 50.0);
    }
    if let Some(macd) = indicators.macd {
        votes.push(macd.histogram > 0.0);
    }
    if let Some(bands) = indicators.bollinger {
        votes.push(price > bands.mid);
    }
    if let Some(stoch) = indicators.stochastic {
        votes.push(stoch.k > stoch.d);
    }
    if let Some(sma20) = indicators.sma20 {
        votes.push(price > sma20);
    }
    if let (Some(sma20), Some(sma50)) = (indicators.sma20, indicators.sma50) {
        votes.push(sma20 > sma50);
    }
    votes
}
