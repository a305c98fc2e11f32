use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use delphi_core::KnowledgeFragment;

use crate::error::PortResult;

/// Metadata restrictions applied by the index before ranking
///
/// Filtering happens inside the index (pre-fusion); an empty post-filter
/// candidate set is a valid result, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentFilter {
    pub strategy_type: Option<String>,
    pub timeframe: Option<String>,
    pub document_type: Option<String>,
}

impl FragmentFilter {
    pub fn is_unfiltered(&self) -> bool {
        self.strategy_type.is_none() && self.timeframe.is_none() && self.document_type.is_none()
    }
}

/// A fragment with its source-native relevance score
///
/// Fusion only uses the rank order; the raw score is kept for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFragment {
    pub fragment: KnowledgeFragment,
    pub score: f64,
}

/// Port for nearest-neighbor similarity search over the embedding index
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` fragments ordered by descending similarity
    async fn knn_search(
        &self,
        vector: &[f32],
        k: usize,
        filter: &FragmentFilter,
    ) -> PortResult<Vec<ScoredFragment>>;
}

/// Port for keyword-relevance search over the same corpus
#[async_trait]
pub trait LexicalIndex: Send + Sync {
    /// Return up to `k` fragments ordered by descending relevance
    async fn search(
        &self,
        query: &str,
        k: usize,
        filter: &FragmentFilter,
    ) -> PortResult<Vec<ScoredFragment>>;
}
