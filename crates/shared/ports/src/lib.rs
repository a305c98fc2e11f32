//! Delphi Ports
//!
//! Port definitions (traits) for the Delphi swing-trading engine.
//! These define the boundaries between the analysis core and the external
//! collaborators it depends on: the embedding service, the knowledge
//! index, the price-history feed, the generative drafter, and the
//! persistence sink. The core never calls out to a network service
//! directly — every external dependency arrives through one of these.

mod drafter;
mod embedding;
mod error;
mod market_data;
mod search;
mod sink;

pub use drafter::{PromptContext, SignalDrafter};
pub use embedding::EmbeddingProvider;
pub use error::{PortError, PortResult};
pub use market_data::PriceHistoryProvider;
pub use search::{FragmentFilter, LexicalIndex, ScoredFragment, VectorIndex};
pub use sink::SignalSink;
