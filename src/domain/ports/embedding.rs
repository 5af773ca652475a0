use crate::domain::{errors::PipelineError, Embedding};
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, PipelineError>;
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, PipelineError>;
    fn dimension(&self) -> usize;
}
