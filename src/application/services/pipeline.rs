use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{instrument, warn};

use crate::domain::{
    ports::{EmbeddingService, LlmService, VectorStore},
    PipelineError, QueryOutcome, ResponseStatus, RetrievedPassage, SourceAttribution,
};

pub const DEFAULT_TOP_K: usize = 5;

const EMBED_TIMEOUT: Duration = Duration::from_secs(30);
const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Query side of the pipeline: embed the question, search the vector store,
/// prompt the completion model with whatever came back.
pub struct RagPipeline {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    llm: Arc<dyn LlmService>,
    system_prompt: String,
    embed_timeout: Duration,
    generation_timeout: Duration,
}

impl RagPipeline {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        llm: Arc<dyn LlmService>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            llm,
            system_prompt: system_prompt.into(),
            embed_timeout: EMBED_TIMEOUT,
            generation_timeout: GENERATION_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, embed: Duration, generation: Duration) -> Self {
        self.embed_timeout = embed;
        self.generation_timeout = generation;
        self
    }

    #[instrument(skip(self))]
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, PipelineError> {
        let embedding = timeout(self.embed_timeout, self.embedding.embed(query))
            .await
            .map_err(|_| PipelineError::timeout("query embedding"))??;
        self.vector_store.query(&embedding, top_k).await
    }

    /// Produces the grounded answer for `query`. Completion failures are
    /// folded into the response text; a broken model never fails the request.
    #[instrument(skip(self, passages), fields(passages = passages.len()))]
    pub async fn generate(&self, query: &str, passages: &[RetrievedPassage]) -> String {
        let context: Vec<&str> = passages.iter().map(|p| p.document.as_str()).collect();
        let prompt = format!("{query}\n\nContext:\n{}", context.join("\n"));

        let completion = timeout(
            self.generation_timeout,
            self.llm.complete_with_system(&self.system_prompt, &prompt),
        )
        .await
        .map_err(|_| PipelineError::timeout("answer generation"))
        .and_then(|result| result);

        match completion {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "completion failed, returning error text");
                format!("Error generating response from AI: {e}")
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn query(&self, query: &str, top_k: usize) -> Result<QueryOutcome, PipelineError> {
        let passages = self.retrieve(query, top_k).await?;
        let sources: Vec<SourceAttribution> = passages
            .iter()
            .map(SourceAttribution::from_passage)
            .collect();
        let response = self.generate(query, &passages).await;

        Ok(QueryOutcome {
            response,
            sources,
            status: ResponseStatus::Success,
        })
    }
}

/// Terminal outcome of pipeline construction. The service binds its port and
/// serves traffic either way; a failed pipeline answers every query with the
/// fixed fallback until the process restarts with working configuration.
#[derive(Clone)]
pub enum PipelineHandle {
    Ready(Arc<RagPipeline>),
    Failed { reason: String },
}

impl PipelineHandle {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub async fn query(&self, query: &str, top_k: usize) -> Result<QueryOutcome, PipelineError> {
        match self {
            Self::Ready(pipeline) => pipeline.query(query, top_k).await,
            Self::Failed { .. } => Ok(QueryOutcome::initializing()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chunk, ChunkMetadata, Embedding};
    use async_trait::async_trait;

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingService for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Embedding, PipelineError> {
            Ok(Embedding::new(vec![1.0, 0.0]))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, PipelineError> {
            Ok(texts.iter().map(|_| Embedding::new(vec![1.0, 0.0])).collect())
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    struct CannedStore {
        passages: Vec<RetrievedPassage>,
    }

    #[async_trait]
    impl VectorStore for CannedStore {
        async fn reset(&self) -> Result<(), PipelineError> {
            Ok(())
        }

        async fn upsert(
            &self,
            _chunks: &[Chunk],
            _embeddings: &[Embedding],
        ) -> Result<(), PipelineError> {
            Ok(())
        }

        async fn query(
            &self,
            _embedding: &Embedding,
            top_k: usize,
        ) -> Result<Vec<RetrievedPassage>, PipelineError> {
            Ok(self.passages.iter().take(top_k).cloned().collect())
        }

        async fn count(&self) -> Result<Option<u64>, PipelineError> {
            Ok(Some(self.passages.len() as u64))
        }
    }

    struct EchoLlm;

    #[async_trait]
    impl LlmService for EchoLlm {
        async fn complete_with_system(
            &self,
            _system: &str,
            prompt: &str,
        ) -> Result<String, PipelineError> {
            Ok(format!("answer: {prompt}"))
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmService for FailingLlm {
        async fn complete_with_system(
            &self,
            _system: &str,
            _prompt: &str,
        ) -> Result<String, PipelineError> {
            Err(PipelineError::generation("model offline"))
        }
    }

    struct SlowLlm;

    #[async_trait]
    impl LlmService for SlowLlm {
        async fn complete_with_system(
            &self,
            _system: &str,
            _prompt: &str,
        ) -> Result<String, PipelineError> {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok("too late".to_string())
        }
    }

    fn passage(text: &str, index: usize, distance: f32) -> RetrievedPassage {
        RetrievedPassage {
            document: text.to_string(),
            metadata: ChunkMetadata {
                chunk_id: index,
                source: "DAFMAN 36-2664".to_string(),
                length: text.len(),
                page_number: None,
            },
            distance,
        }
    }

    fn pipeline(passages: Vec<RetrievedPassage>, llm: Arc<dyn LlmService>) -> RagPipeline {
        RagPipeline::new(
            Arc::new(FixedEmbedder),
            Arc::new(CannedStore { passages }),
            llm,
            "system prompt",
        )
    }

    #[tokio::test]
    async fn query_builds_sources_and_answer() {
        let p = pipeline(
            vec![passage("first passage", 0, 0.1), passage("second", 1, 0.4)],
            Arc::new(EchoLlm),
        );

        let outcome = p.query("what is policy", 5).await.unwrap();

        assert_eq!(outcome.status, ResponseStatus::Success);
        assert_eq!(outcome.sources.len(), 2);
        assert_eq!(outcome.sources[0].chunk_id, 0);
        assert_eq!(outcome.sources[0].preview, "first passage");
        assert!(outcome.response.contains("what is policy"));
        assert!(outcome.response.contains("Context:\nfirst passage\nsecond"));
    }

    #[tokio::test]
    async fn empty_collection_still_generates() {
        let p = pipeline(vec![], Arc::new(EchoLlm));

        let outcome = p.query("anything", 5).await.unwrap();

        assert!(outcome.sources.is_empty());
        assert_eq!(outcome.status, ResponseStatus::Success);
        assert!(outcome.response.starts_with("answer: anything"));
        assert!(outcome.response.ends_with("\n\nContext:\n"));
    }

    #[tokio::test]
    async fn generation_failure_degrades_to_error_text() {
        let p = pipeline(vec![passage("p", 0, 0.2)], Arc::new(FailingLlm));

        let outcome = p.query("q", 5).await.unwrap();

        assert_eq!(outcome.status, ResponseStatus::Success);
        assert_eq!(outcome.sources.len(), 1);
        assert!(outcome
            .response
            .starts_with("Error generating response from AI:"));
        assert!(outcome.response.contains("model offline"));
    }

    #[tokio::test]
    async fn generation_timeout_degrades_to_error_text() {
        let p = pipeline(vec![], Arc::new(SlowLlm))
            .with_timeouts(Duration::from_secs(30), Duration::from_millis(10));

        let outcome = p.query("q", 5).await.unwrap();

        assert!(outcome
            .response
            .starts_with("Error generating response from AI:"));
        assert!(outcome.response.contains("Timeout"));
    }

    #[tokio::test]
    async fn top_k_limits_retrieval() {
        let passages: Vec<RetrievedPassage> =
            (0..10).map(|i| passage("text", i, i as f32 * 0.1)).collect();
        let p = pipeline(passages, Arc::new(EchoLlm));

        let results = p.retrieve("q", 3).await.unwrap();

        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn failed_handle_serves_the_initializing_outcome() {
        let handle = PipelineHandle::Failed {
            reason: "GROQ_API_KEY is not set".to_string(),
        };

        let outcome = handle.query("anything", 5).await.unwrap();

        assert!(!handle.is_ready());
        assert_eq!(outcome.status, ResponseStatus::MockResponse);
        assert!(outcome.sources.is_empty());
        assert!(outcome.response.contains("initializing"));
    }
}
