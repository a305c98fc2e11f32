//! Delphi Analysis Engine
//!
//! Ties the pure pieces together: market state construction, retrieval
//! query and prompt building, drafter output validation, confidence
//! scoring, final ranking, and the bounded fan-out over a watchlist.
//!
//! The engine is a library: it owns no wire format, CLI, or schedule.
//! The orchestration layer that decides *when* to run injects the
//! external collaborators (see `delphi-ports`) and receives a
//! [`CycleReport`] back.

mod config;
mod cycle;
mod draft;
mod query;
mod rank;
mod score;
mod state;

pub use config::{ConfigError, EngineConfig, ScoringWeights};
pub use cycle::{
    AnalysisEngine, Collaborators, CycleReport, CycleStatus, SymbolFailure, WatchlistItem,
};
pub use draft::{
    DEFAULT_HOLDING_DAYS, DraftError, ParsedDraft, PriceLevels, parse_draft,
};
pub use query::{build_market_summary, build_prompt, build_query};
pub use rank::rank;
pub use score::{ConfidenceScorer, confluence, pattern_confidence, source_agreement};
pub use state::{StateError, build as build_market_state};
