//! Hybrid retriever: concurrent vector + lexical search, fused by RRF.
//!
//! Filters are applied by the indices before fusion. Zero fragments after
//! filtering is a valid result — downstream treats it as evidence to force
//! HOLD. The retriever holds no cache; callers that want one own its
//! keying and invalidation.

use std::sync::Arc;

use tracing::debug;

use delphi_core::RetrievalResult;
use delphi_ports::{FragmentFilter, LexicalIndex, PortResult, VectorIndex};

use crate::fusion::{RrfConfig, fuse};

/// Fuses the two injected knowledge-index rankings into one
pub struct HybridRetriever {
    vector: Arc<dyn VectorIndex>,
    lexical: Arc<dyn LexicalIndex>,
    config: RrfConfig,
}

impl HybridRetriever {
    /// `config` must already be validated (see [`RrfConfig::validate`])
    pub fn new(
        vector: Arc<dyn VectorIndex>,
        lexical: Arc<dyn LexicalIndex>,
        config: RrfConfig,
    ) -> Self {
        Self {
            vector,
            lexical,
            config,
        }
    }

    /// Retrieve up to `k` fragments for a query
    ///
    /// Both source searches run concurrently; each is asked for
    /// `k × candidate_multiplier` candidates so fusion sees a wider pool
    /// than it returns.
    pub async fn retrieve(
        &self,
        query_text: &str,
        query_vector: &[f32],
        filter: &FragmentFilter,
        k: usize,
    ) -> PortResult<RetrievalResult> {
        if k == 0 {
            return Ok(RetrievalResult::empty());
        }

        let pool = k * self.config.candidate_multiplier;
        let (vector_hits, lexical_hits) = tokio::join!(
            self.vector.knn_search(query_vector, pool, filter),
            self.lexical.search(query_text, pool, filter),
        );
        let vector_hits = vector_hits?;
        let lexical_hits = lexical_hits?;

        let mut hits = fuse(&vector_hits, &lexical_hits, &self.config);
        hits.truncate(k);

        debug!(
            vector = vector_hits.len(),
            lexical = lexical_hits.len(),
            fused = hits.len(),
            "hybrid retrieval complete"
        );

        Ok(RetrievalResult { hits })
    }
}
