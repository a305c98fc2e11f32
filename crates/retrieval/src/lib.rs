//! Delphi Hybrid Retrieval
//!
//! Fuses a vector-similarity ranking and a lexical-relevance ranking over
//! the trading-knowledge corpus into one deterministic fused ranking via
//! Reciprocal Rank Fusion. The two source searches are external
//! collaborators injected through ports; this crate owns only the fusion
//! algorithm and its ordering guarantees.

mod fusion;
mod retriever;

pub use fusion::{FusionConfigError, RrfConfig, fuse};
pub use retriever::HybridRetriever;
