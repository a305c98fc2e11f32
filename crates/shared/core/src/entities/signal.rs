use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FragmentId, KnowledgeFragment, MarketState};
use crate::values::{Confidence, Symbol, Timestamp};

/// Unique identifier for a signal
pub type SignalId = Uuid;

/// Recommended action for a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl SignalAction {
    pub fn is_directional(&self) -> bool {
        !matches!(self, SignalAction::Hold)
    }
}

/// Reference to a knowledge fragment supporting a signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub fragment_id: FragmentId,
    pub source_title: String,
    pub chapter: Option<String>,
    pub page: Option<u32>,
}

impl Citation {
    /// Build a citation referencing a retrieved fragment
    pub fn for_fragment(fragment: &KnowledgeFragment) -> Self {
        Self {
            fragment_id: fragment.id.clone(),
            source_title: fragment.source_title.clone(),
            chapter: fragment.chapter.clone(),
            page: fragment.page,
        }
    }
}

/// One scored recommendation for one symbol in one analysis cycle
///
/// Created once per symbol per cycle and immutable after scoring
/// completes. A directional signal must carry at least one citation; the
/// ranker enforces that invariant as a final gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub symbol: Symbol,
    pub action: SignalAction,
    pub confidence: Confidence,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss: f64,
    pub holding_period_days: u32,
    pub risk_reward_ratio: f64,
    pub reasoning: String,
    pub citations: Vec<Citation>,
    pub market_state: MarketState,
    pub created_at: Timestamp,
}

impl Signal {
    /// A HOLD signal anchored at the current price
    ///
    /// Used both for genuine hold recommendations and for per-symbol
    /// degradation: the reason explains which it is.
    pub fn hold(
        symbol: impl Into<Symbol>,
        price: f64,
        reasoning: impl Into<String>,
        market_state: MarketState,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            action: SignalAction::Hold,
            confidence: Confidence::ZERO,
            entry_price: price,
            target_price: price,
            stop_loss: price,
            holding_period_days: 0,
            risk_reward_ratio: 0.0,
            reasoning: reasoning.into(),
            citations: Vec::new(),
            market_state,
            created_at: Utc::now(),
        }
    }

    /// Number of distinct source titles among the citations
    pub fn distinct_sources(&self) -> usize {
        let mut titles: Vec<&str> = self
            .citations
            .iter()
            .map(|citation| citation.source_title.as_str())
            .collect();
        titles.sort_unstable();
        titles.dedup();
        titles.len()
    }
}

/// Signals across the whole watchlist, sorted by confidence descending
/// with deterministic tie-breaking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankedOpportunities(Vec<Signal>);

impl RankedOpportunities {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self(signals)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Signal] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Signal> {
        self.0
    }
}

impl<'a> IntoIterator for &'a RankedOpportunities {
    type Item = &'a Signal;
    type IntoIter = std::slice::Iter<'a, Signal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
