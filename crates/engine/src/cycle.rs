//! Watchlist cycle orchestration.
//!
//! One cycle analyzes every tracked symbol independently: indicators,
//! market state, hybrid retrieval, drafter call, scoring. Symbols fan
//! out over a bounded task set and share no mutable state; results merge
//! only at the final ranking step. A symbol that fails anywhere along
//! its pipeline degrades to HOLD with a human-readable reason — it is
//! never silently dropped from the ranked output.
//!
//! The engine itself is stateless between cycles and performs no retries
//! and no writes; retry policy belongs to the caller.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use delphi_core::{
    IndicatorSet, MarketState, RankedOpportunities, RetrievalResult, Signal, Symbol,
};
use delphi_ports::{
    EmbeddingProvider, LexicalIndex, PortError, PortResult, PriceHistoryProvider, SignalDrafter,
    SignalSink, VectorIndex,
};
use delphi_retrieval::HybridRetriever;

use crate::config::{ConfigError, EngineConfig};
use crate::draft::parse_draft;
use crate::query::{build_prompt, build_query};
use crate::rank::rank;
use crate::score::{ConfidenceScorer, confluence};
use crate::state::build;

/// One watchlist entry: a symbol plus whatever sentiment the caller has
#[derive(Debug, Clone)]
pub struct WatchlistItem {
    pub symbol: Symbol,
    /// News sentiment in [-1, 1], when the caller's pipeline produced one
    pub news_sentiment: Option<f64>,
}

impl WatchlistItem {
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            news_sentiment: None,
        }
    }

    pub fn with_sentiment(mut self, sentiment: f64) -> Self {
        self.news_sentiment = Some(sentiment);
        self
    }
}

impl From<&str> for WatchlistItem {
    fn from(symbol: &str) -> Self {
        Self::new(symbol)
    }
}

/// Why one symbol degraded to HOLD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFailure {
    pub symbol: Symbol,
    pub reason: String,
}

/// Batch-level health of a finished cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    /// Every symbol produced a full-pipeline signal
    Complete,
    /// Some symbols degraded to HOLD
    Degraded { degraded: usize },
    /// Every symbol degraded — the batch ran but produced no analysis
    Failed,
}

/// Everything a finished cycle hands back to the caller
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// One entry per watchlist symbol, ranked
    pub opportunities: RankedOpportunities,
    pub failures: Vec<SymbolFailure>,
    /// Persistence errors, reported but never fatal
    pub sink_failures: Vec<SymbolFailure>,
    pub status: CycleStatus,
}

/// External collaborators injected into the engine
pub struct Collaborators {
    pub history: Arc<dyn PriceHistoryProvider>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub vector: Arc<dyn VectorIndex>,
    pub lexical: Arc<dyn LexicalIndex>,
    pub drafter: Arc<dyn SignalDrafter>,
    /// Optional output boundary; `None` means the caller persists
    pub sink: Option<Arc<dyn SignalSink>>,
}

/// The analysis engine: re-entrant, stateless between cycles
#[derive(Clone)]
pub struct AnalysisEngine {
    config: EngineConfig,
    scorer: ConfidenceScorer,
    retriever: Arc<HybridRetriever>,
    history: Arc<dyn PriceHistoryProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    drafter: Arc<dyn SignalDrafter>,
    sink: Option<Arc<dyn SignalSink>>,
}

impl AnalysisEngine {
    /// Validate the configuration and wire the collaborators
    ///
    /// An invalid configuration is fatal here — the engine refuses to
    /// run any cycle with it.
    pub fn new(config: EngineConfig, collaborators: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;

        let retriever = Arc::new(HybridRetriever::new(
            collaborators.vector,
            collaborators.lexical,
            config.rrf.clone(),
        ));
        let scorer = ConfidenceScorer::new(config.weights);

        Ok(Self {
            config,
            scorer,
            retriever,
            history: collaborators.history,
            embedder: collaborators.embedder,
            drafter: collaborators.drafter,
            sink: collaborators.sink,
        })
    }

    /// Analyze the whole watchlist and rank the results
    pub async fn run_cycle(&self, watchlist: &[WatchlistItem]) -> CycleReport {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));

        let handles: Vec<_> = watchlist
            .iter()
            .map(|item| {
                let engine = self.clone();
                let item = item.clone();
                let semaphore = semaphore.clone();
                tokio::spawn(async move {
                    // Never closed while the cycle is running
                    let _permit = semaphore.acquire_owned().await;
                    engine.analyze_symbol(&item).await
                })
            })
            .collect();

        let mut signals = Vec::with_capacity(watchlist.len());
        let mut failures = Vec::new();
        for (item, handle) in watchlist.iter().zip(handles) {
            let (signal, failure) = match handle.await {
                Ok(outcome) => outcome,
                // A panicked symbol task degrades like any other failure;
                // the other symbols are unaffected
                Err(err) => degraded(
                    &item.symbol,
                    None,
                    format!("analysis task aborted: {err}"),
                ),
            };
            signals.push(signal);
            if let Some(failure) = failure {
                failures.push(failure);
            }
        }

        let status = cycle_status(failures.len(), watchlist.len());
        let opportunities = rank(signals);

        let mut sink_failures = Vec::new();
        if let Some(sink) = &self.sink {
            for signal in &opportunities {
                if let Err(err) = sink.persist(signal).await {
                    warn!(symbol = %signal.symbol, error = %err, "failed to persist signal");
                    sink_failures.push(SymbolFailure {
                        symbol: signal.symbol.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            symbols = watchlist.len(),
            degraded = failures.len(),
            status = ?status,
            "watchlist cycle complete"
        );

        CycleReport {
            opportunities,
            failures,
            sink_failures,
            status,
        }
    }

    /// One symbol's full pipeline; every failure path lands on a
    /// HOLD-with-reason outcome
    async fn analyze_symbol(&self, item: &WatchlistItem) -> (Signal, Option<SymbolFailure>) {
        let symbol = item.symbol.as_str();

        let bars = match self
            .history
            .history(symbol, self.config.lookback_days)
            .await
        {
            Ok(bars) => bars,
            Err(err) => {
                return degraded(symbol, None, format!("price history unavailable: {err}"));
            }
        };

        let state = match build(symbol, &bars, item.news_sentiment) {
            Ok(state) => state,
            Err(err) => return degraded(symbol, None, format!("market state unavailable: {err}")),
        };

        let query = build_query(&state);
        let retrieval = match self.retrieve_with_deadline(&query).await {
            Ok(retrieval) => retrieval,
            Err(err) => {
                return degraded(
                    symbol,
                    Some(state),
                    format!("knowledge retrieval failed: {err}"),
                );
            }
        };

        if retrieval.is_empty() {
            return degraded(
                symbol,
                Some(state),
                "no supporting knowledge fragments after filtering".to_string(),
            );
        }

        let prompt = build_prompt(&state, &query, &retrieval);
        let raw = match timeout(self.config.drafter_timeout, self.drafter.generate(&prompt)).await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => {
                return degraded(symbol, Some(state), format!("drafter unavailable: {err}"));
            }
            Err(_) => {
                let deadline_ms = self.config.drafter_timeout.as_millis() as u64;
                return degraded(
                    symbol,
                    Some(state),
                    PortError::timeout("drafter", deadline_ms).to_string(),
                );
            }
        };

        let parsed = match parse_draft(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                return degraded(
                    symbol,
                    Some(state),
                    format!("draft could not be validated: {err}"),
                );
            }
        };

        let citations = parsed.resolve_citations(&retrieval);
        let indicator_strength = confluence(parsed.action, &state);
        let confidence =
            self.scorer
                .score(parsed.llm_confidence, &citations, indicator_strength, &state);

        let (entry_price, target_price, stop_loss) = match parsed.levels {
            Some(levels) => (levels.entry, levels.target, levels.stop),
            None => (state.price, state.price, state.price),
        };

        let signal = Signal {
            id: Uuid::new_v4(),
            symbol: item.symbol.clone(),
            action: parsed.action,
            confidence,
            entry_price,
            target_price,
            stop_loss,
            holding_period_days: parsed.holding_period_days,
            risk_reward_ratio: parsed.risk_reward_ratio(),
            reasoning: parsed.reasoning,
            citations,
            market_state: state,
            created_at: Utc::now(),
        };

        debug!(
            symbol,
            action = ?signal.action,
            confidence = %signal.confidence,
            citations = signal.citations.len(),
            "symbol analyzed"
        );
        (signal, None)
    }

    /// Query embedding plus both index searches under one deadline
    async fn retrieve_with_deadline(&self, query: &str) -> PortResult<RetrievalResult> {
        let deadline = self.config.retrieval_timeout;
        let retrieve = async {
            let vector = self.embedder.embed(query).await?;
            self.retriever
                .retrieve(
                    query,
                    &vector,
                    &self.config.fragment_filter,
                    self.config.retrieval_k,
                )
                .await
        };
        match timeout(deadline, retrieve).await {
            Ok(result) => result,
            Err(_) => Err(PortError::timeout("retrieval", deadline.as_millis() as u64)),
        }
    }
}

fn cycle_status(degraded: usize, total: usize) -> CycleStatus {
    if degraded == 0 {
        CycleStatus::Complete
    } else if degraded == total {
        CycleStatus::Failed
    } else {
        CycleStatus::Degraded { degraded }
    }
}

/// Degrade one symbol to HOLD, preserving whatever market context exists
fn degraded(
    symbol: &str,
    state: Option<MarketState>,
    reason: String,
) -> (Signal, Option<SymbolFailure>) {
    warn!(symbol, reason = reason.as_str(), "degrading symbol to HOLD");
    let state = state.unwrap_or_else(|| placeholder_state(symbol));
    let price = state.price;
    let signal = Signal::hold(symbol, price, reason.clone(), state);
    (
        signal,
        Some(SymbolFailure {
            symbol: symbol.to_string(),
            reason,
        }),
    )
}

/// Market state for a symbol whose history never arrived
fn placeholder_state(symbol: &str) -> MarketState {
    MarketState {
        symbol: symbol.to_string(),
        price: 0.0,
        price_change_1d: 0.0,
        volume_ratio: None,
        indicators: IndicatorSet::empty(symbol, Utc::now()),
        patterns: Vec::new(),
        news_sentiment: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reflects_degradation_counts() {
        assert_eq!(cycle_status(0, 5), CycleStatus::Complete);
        assert_eq!(cycle_status(2, 5), CycleStatus::Degraded { degraded: 2 });
        assert_eq!(cycle_status(5, 5), CycleStatus::Failed);
    }

    #[test]
    fn watchlist_item_carries_sentiment() {
        let item = WatchlistItem::new("AAPL").with_sentiment(0.4);
        assert_eq!(item.symbol, "AAPL");
        assert_eq!(item.news_sentiment, Some(0.4));

        let bare: WatchlistItem = "MSFT".into();
        assert_eq!(bare.news_sentiment, None);
    }

    #[test]
    fn degraded_outcome_holds_at_known_price() {
        let state = placeholder_state("AAPL");
        let (signal, failure) = degraded("AAPL", Some(state), "it broke".to_string());
        assert_eq!(signal.action, delphi_core::SignalAction::Hold);
        assert_eq!(failure.unwrap().reason, "it broke");
    }
}
