use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use delphi_core::{KnowledgeFragment, Symbol};

use crate::error::PortResult;

/// Everything the drafter model is shown for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    pub symbol: Symbol,
    /// The retrieval query the evidence was gathered with
    pub query: String,
    /// Normalized market-state description (indicators, patterns, volume)
    pub market_summary: String,
    /// Knowledge fragments retrieved as supporting evidence, in fused
    /// rank order
    pub fragments: Vec<KnowledgeFragment>,
}

/// Port for the external generative step that proposes a signal draft
///
/// The returned text is untrusted: it may be malformed, incomplete, or
/// inconsistent with the supplied evidence. The core validates it with a
/// total parse and never assumes well-formed output.
#[async_trait]
pub trait SignalDrafter: Send + Sync {
    /// Produce the model's raw draft text for this context
    async fn generate(&self, prompt: &PromptContext) -> PortResult<String>;
}
