//! End-to-end cycle tests with in-memory collaborators.
//!
//! Everything external is mocked at the ports; the full pipeline
//! (indicators → state → retrieval → draft → score → rank) runs for
//! real.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};

use delphi_core::{
    FragmentId, FragmentTags, KnowledgeFragment, PriceBar, Signal, SignalAction,
};
use delphi_engine::{
    AnalysisEngine, Collaborators, CycleStatus, EngineConfig, WatchlistItem,
};
use delphi_ports::{
    EmbeddingProvider, FragmentFilter, LexicalIndex, PortError, PortResult,
    PriceHistoryProvider, PromptContext, ScoredFragment, SignalDrafter, SignalSink, VectorIndex,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

// --- mock collaborators ---------------------------------------------------

fn rising_bars(count: usize) -> Vec<PriceBar> {
    let start = Utc.with_ymd_and_hms(2025, 1, 6, 21, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let close = 100.0 + i as f64 * 0.5;
            PriceBar {
                timestamp: start + ChronoDuration::days(i as i64),
                open: close - 0.2,
                high: close + 1.0,
                low: close - 1.2,
                close,
                volume: 1_000.0 + (i % 7) as f64 * 10.0,
            }
        })
        .collect()
}

struct MockHistory {
    bars: Vec<PriceBar>,
}

#[async_trait]
impl PriceHistoryProvider for MockHistory {
    async fn history(&self, _symbol: &str, _lookback_days: u32) -> PortResult<Vec<PriceBar>> {
        Ok(self.bars.clone())
    }
}

struct DownHistory;

#[async_trait]
impl PriceHistoryProvider for DownHistory {
    async fn history(&self, _symbol: &str, _lookback_days: u32) -> PortResult<Vec<PriceBar>> {
        Err(PortError::unavailable("price-history", "feed offline"))
    }
}

struct MockEmbedder;

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, _text: &str) -> PortResult<Vec<f32>> {
        Ok(vec![0.1; 8])
    }
}

fn fragment(id: &str, title: &str) -> KnowledgeFragment {
    KnowledgeFragment {
        id: FragmentId::new(id),
        text: format!("knowledge chunk {id}"),
        source_title: title.to_string(),
        chapter: Some("Entries".to_string()),
        page: Some(12),
        tags: FragmentTags {
            strategy_type: Some("swing_trading".to_string()),
            ..FragmentTags::default()
        },
    }
}

fn corpus() -> Vec<ScoredFragment> {
    vec![
        ScoredFragment {
            fragment: fragment("frag-1", "Swing Trading Basics"),
            score: 0.9,
        },
        ScoredFragment {
            fragment: fragment("frag-2", "Momentum Entries"),
            score: 0.7,
        },
        ScoredFragment {
            fragment: fragment("frag-3", "Risk Rules"),
            score: 0.5,
        },
    ]
}

struct MockVector {
    hits: Vec<ScoredFragment>,
}

#[async_trait]
impl VectorIndex for MockVector {
    async fn knn_search(
        &self,
        _vector: &[f32],
        _k: usize,
        _filter: &FragmentFilter,
    ) -> PortResult<Vec<ScoredFragment>> {
        Ok(self.hits.clone())
    }
}

struct MockLexical {
    hits: Vec<ScoredFragment>,
}

#[async_trait]
impl LexicalIndex for MockLexical {
    async fn search(
        &self,
        _query: &str,
        _k: usize,
        _filter: &FragmentFilter,
    ) -> PortResult<Vec<ScoredFragment>> {
        Ok(self.hits.clone())
    }
}

/// Scripted drafter: per-symbol responses, with a well-formed default
struct MockDrafter {
    responses: HashMap<String, String>,
    delay: Option<Duration>,
}

impl MockDrafter {
    fn well_formed() -> Self {
        Self {
            responses: HashMap::new(),
            delay: None,
        }
    }

    fn with_response(mut self, symbol: &str, response: &str) -> Self {
        self.responses.insert(symbol.to_string(), response.to_string());
        self
    }
}

fn buy_draft() -> String {
    r#"{
        "action": "BUY",
        "confidence": 70,
        "entry_price": 130.0,
        "target_price": 142.0,
        "stop_loss": 124.0,
        "holding_period_days": 6,
        "reasoning": "uptrend continuation with momentum confluence",
        "citations": ["frag-1", "frag-2"]
    }"#
    .to_string()
}

#[async_trait]
impl SignalDrafter for MockDrafter {
    async fn generate(&self, prompt: &PromptContext) -> PortResult<String> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .responses
            .get(prompt.symbol.as_str())
            .cloned()
            .unwrap_or_else(buy_draft))
    }
}

#[derive(Default)]
struct RecordingSink {
    persisted: Mutex<Vec<Signal>>,
}

#[async_trait]
impl SignalSink for RecordingSink {
    async fn persist(&self, signal: &Signal) -> PortResult<()> {
        self.persisted.lock().unwrap().push(signal.clone());
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl SignalSink for FailingSink {
    async fn persist(&self, _signal: &Signal) -> PortResult<()> {
        Err(PortError::unavailable("signal-sink", "table locked"))
    }
}

fn engine_with(
    drafter: MockDrafter,
    sink: Option<Arc<dyn SignalSink>>,
    config: EngineConfig,
) -> AnalysisEngine {
    AnalysisEngine::new(
        config,
        Collaborators {
            history: Arc::new(MockHistory {
                bars: rising_bars(60),
            }),
            embedder: Arc::new(MockEmbedder),
            vector: Arc::new(MockVector { hits: corpus() }),
            lexical: Arc::new(MockLexical { hits: corpus() }),
            drafter: Arc::new(drafter),
            sink,
        },
    )
    .unwrap()
}

fn watchlist(symbols: &[&str]) -> Vec<WatchlistItem> {
    symbols.iter().map(|s| WatchlistItem::new(*s)).collect()
}

fn find<'a>(report: &'a delphi_engine::CycleReport, symbol: &str) -> &'a Signal {
    report
        .opportunities
        .iter()
        .find(|signal| signal.symbol == symbol)
        .unwrap_or_else(|| panic!("{symbol} missing from ranked output"))
}

// --- scenarios ------------------------------------------------------------

#[tokio::test]
async fn full_pipeline_produces_cited_directional_signals() {
    init_tracing();
    let engine = engine_with(MockDrafter::well_formed(), None, EngineConfig::default());
    let report = engine.run_cycle(&watchlist(&["AAPL", "MSFT"])).await;

    assert_eq!(report.status, CycleStatus::Complete);
    assert_eq!(report.opportunities.len(), 2);
    assert!(report.failures.is_empty());

    for signal in &report.opportunities {
        assert_eq!(signal.action, SignalAction::Buy);
        assert_eq!(signal.citations.len(), 2);
        assert!(signal.confidence.value() > 0.0);
        assert!(signal.confidence.value() <= 100.0);
        assert!((signal.risk_reward_ratio - 2.0).abs() < 1e-9);
        assert!(signal.market_state.indicators.rsi14.is_some());
    }
}

#[tokio::test]
async fn malformed_draft_degrades_only_its_symbol() {
    init_tracing();
    let drafter = MockDrafter::well_formed()
        .with_response("MALFORMEDX", "sorry, I cannot produce a recommendation today");
    let engine = engine_with(drafter, None, EngineConfig::default());

    let symbols = ["AAPL", "AMZN", "MALFORMEDX", "MSFT", "NVDA"];
    let report = engine.run_cycle(&watchlist(&symbols)).await;

    // All five symbols appear, none silently dropped
    assert_eq!(report.opportunities.len(), 5);
    assert_eq!(report.status, CycleStatus::Degraded { degraded: 1 });

    let degraded = find(&report, "MALFORMEDX");
    assert_eq!(degraded.action, SignalAction::Hold);
    assert!(!degraded.reasoning.is_empty());
    assert!(degraded.reasoning.contains("draft could not be validated"));

    for symbol in ["AAPL", "AMZN", "MSFT", "NVDA"] {
        assert_eq!(find(&report, symbol).action, SignalAction::Buy);
    }
}

#[tokio::test]
async fn empty_retrieval_forces_hold() {
    let engine = AnalysisEngine::new(
        EngineConfig::default(),
        Collaborators {
            history: Arc::new(MockHistory {
                bars: rising_bars(60),
            }),
            embedder: Arc::new(MockEmbedder),
            vector: Arc::new(MockVector { hits: Vec::new() }),
            lexical: Arc::new(MockLexical { hits: Vec::new() }),
            drafter: Arc::new(MockDrafter::well_formed()),
            sink: None,
        },
    )
    .unwrap();

    let report = engine.run_cycle(&watchlist(&["AAPL"])).await;
    let signal = find(&report, "AAPL");
    assert_eq!(signal.action, SignalAction::Hold);
    assert!(signal.reasoning.contains("no supporting knowledge fragments"));
    // The degraded HOLD still carries real market context
    assert!(signal.market_state.indicators.rsi14.is_some());
}

#[tokio::test]
async fn citations_of_unretrieved_fragments_are_dropped_and_gated() {
    let uncited_buy = r#"{
        "action": "BUY",
        "confidence": 88,
        "entry_price": 130.0,
        "target_price": 142.0,
        "stop_loss": 124.0,
        "citations": ["made-up-frag", "another-hallucination"]
    }"#;
    let drafter = MockDrafter::well_formed().with_response("AAPL", uncited_buy);
    let engine = engine_with(drafter, None, EngineConfig::default());

    let report = engine.run_cycle(&watchlist(&["AAPL"])).await;
    let signal = find(&report, "AAPL");

    // The drafter said BUY, but none of its citations survived validation
    assert_eq!(signal.action, SignalAction::Hold);
    assert!(signal.citations.is_empty());
    assert!(signal.reasoning.contains("no supporting citations"));
}

#[tokio::test]
async fn drafter_deadline_degrades_that_symbol_only() {
    let mut drafter = MockDrafter::well_formed();
    drafter.delay = Some(Duration::from_millis(200));
    let slow = AnalysisEngine::new(
        EngineConfig {
            drafter_timeout: Duration::from_millis(50),
            ..EngineConfig::default()
        },
        Collaborators {
            history: Arc::new(MockHistory {
                bars: rising_bars(60),
            }),
            embedder: Arc::new(MockEmbedder),
            vector: Arc::new(MockVector { hits: corpus() }),
            lexical: Arc::new(MockLexical { hits: corpus() }),
            drafter: Arc::new(drafter),
            sink: None,
        },
    )
    .unwrap();

    let report = slow.run_cycle(&watchlist(&["AAPL"])).await;
    let signal = find(&report, "AAPL");
    assert_eq!(signal.action, SignalAction::Hold);
    assert!(signal.reasoning.contains("deadline"));
    assert_eq!(report.status, CycleStatus::Failed);
}

#[tokio::test]
async fn history_outage_for_every_symbol_reports_failed_batch() {
    let engine = AnalysisEngine::new(
        EngineConfig::default(),
        Collaborators {
            history: Arc::new(DownHistory),
            embedder: Arc::new(MockEmbedder),
            vector: Arc::new(MockVector { hits: corpus() }),
            lexical: Arc::new(MockLexical { hits: corpus() }),
            drafter: Arc::new(MockDrafter::well_formed()),
            sink: None,
        },
    )
    .unwrap();

    let report = engine.run_cycle(&watchlist(&["AAPL", "MSFT", "NVDA"])).await;

    assert_eq!(report.status, CycleStatus::Failed);
    assert_eq!(report.opportunities.len(), 3);
    assert_eq!(report.failures.len(), 3);
    for signal in &report.opportunities {
        assert_eq!(signal.action, SignalAction::Hold);
        assert!(signal.reasoning.contains("price history unavailable"));
    }
}

#[tokio::test]
async fn ranked_signals_reach_the_sink_in_order() {
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(
        MockDrafter::well_formed(),
        Some(sink.clone()),
        EngineConfig::default(),
    );

    let report = engine.run_cycle(&watchlist(&["MSFT", "AAPL"])).await;
    let persisted = sink.persisted.lock().unwrap();

    assert_eq!(persisted.len(), 2);
    let ranked: Vec<&str> = report
        .opportunities
        .iter()
        .map(|s| s.symbol.as_str())
        .collect();
    let sunk: Vec<&str> = persisted.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(ranked, sunk);
    assert!(report.sink_failures.is_empty());
}

#[tokio::test]
async fn sink_failures_are_reported_but_not_fatal() {
    let engine = engine_with(
        MockDrafter::well_formed(),
        Some(Arc::new(FailingSink)),
        EngineConfig::default(),
    );

    let report = engine.run_cycle(&watchlist(&["AAPL"])).await;
    assert_eq!(report.status, CycleStatus::Complete);
    assert_eq!(report.sink_failures.len(), 1);
    assert!(report.sink_failures[0].reason.contains("signal-sink"));
}

#[tokio::test]
async fn identical_inputs_rank_identically() {
    let engine = engine_with(MockDrafter::well_formed(), None, EngineConfig::default());
    let list = watchlist(&["NVDA", "AAPL", "MSFT"]);

    let first = engine.run_cycle(&list).await;
    let second = engine.run_cycle(&list).await;

    let order = |report: &delphi_engine::CycleReport| -> Vec<String> {
        report
            .opportunities
            .iter()
            .map(|s| s.symbol.clone())
            .collect()
    };
    assert_eq!(order(&first), order(&second));
    // Equal confidence and risk/reward everywhere → symbol lexical order
    assert_eq!(order(&first), vec!["AAPL", "MSFT", "NVDA"]);
}

#[tokio::test]
async fn empty_watchlist_is_a_complete_empty_cycle() {
    let engine = engine_with(MockDrafter::well_formed(), None, EngineConfig::default());
    let report = engine.run_cycle(&[]).await;
    assert_eq!(report.status, CycleStatus::Complete);
    assert!(report.opportunities.is_empty());
}
