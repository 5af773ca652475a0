use crate::domain::{errors::PipelineError, Chunk, Embedding, RetrievedPassage};
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Drops and recreates the backing collection so a fresh ingest never
    /// mixes with stale points.
    async fn reset(&self) -> Result<(), PipelineError>;
    async fn upsert(
        &self,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<(), PipelineError>;
    /// Nearest neighbors ordered ascending by cosine distance.
    async fn query(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, PipelineError>;
    /// Stored point count, or `None` when the collection does not exist yet.
    async fn count(&self) -> Result<Option<u64>, PipelineError>;
}
