use async_trait::async_trait;

use crate::domain::{ports::EmbeddingService, Embedding, PipelineError};
use crate::infrastructure::config::EmbeddingConfig;

/// Deterministic character-trigram embedder. Lowercased trigrams are hashed
/// into a fixed number of buckets and the counts L2-normalized, so the same
/// text always yields the identical vector with no model download or network
/// round trip. Quality is far below a sentence transformer; it exists so the
/// service runs self-contained.
pub struct HashedNgramEmbedding {
    dimension: usize,
}

impl HashedNgramEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(config.dimension)
    }

    fn embed_sync(&self, text: &str) -> Embedding {
        let mut vector = vec![0f32; self.dimension];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return Embedding::new(vector);
        }

        for window in chars.windows(3) {
            let token: String = window.iter().collect();
            // FNV-1a over the trigram bytes.
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Embedding::new(vector)
    }
}

#[async_trait]
impl EmbeddingService for HashedNgramEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, PipelineError> {
        Ok(self.embed_sync(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, PipelineError> {
        Ok(texts.iter().map(|t| self.embed_sync(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
