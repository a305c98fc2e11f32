use async_trait::async_trait;

use crate::error::PortResult;

/// Port for turning query text into an embedding vector
///
/// Embedding generation itself (model choice, batching, retries) lives
/// behind this boundary. The core only needs a vector to hand to the
/// vector index.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> PortResult<Vec<f32>>;
}
