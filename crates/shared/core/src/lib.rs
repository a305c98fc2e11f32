//! Delphi Core Domain
//!
//! Pure domain types for the Delphi swing-trading engine.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    BollingerBands,
    Citation,
    FragmentId,
    FragmentTags,
    IndicatorSet,
    KnowledgeFragment,
    MacdLine,
    MarketState,
    Pattern,
    PatternDirection,
    PatternKind,
    PriceBar,
    RankedFragment,
    RankedOpportunities,
    RetrievalResult,
    Signal,
    SignalAction,
    StochasticOscillator,
};
pub use values::{Confidence, Strength, Symbol, Timestamp};
