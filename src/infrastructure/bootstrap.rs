use std::sync::Arc;

use tracing::{error, info};

use crate::application::{DocumentProcessor, PipelineHandle, RagPipeline};
use crate::domain::ports::{EmbeddingService, LlmService, VectorStore};
use crate::domain::PipelineError;
use crate::infrastructure::config::{AppConfig, EmbeddingConfig, LlmConfig};
use crate::infrastructure::embedding::{HashedNgramEmbedding, RemoteEmbedding};
use crate::infrastructure::extractor::PdfTextExtractor;
use crate::infrastructure::llm::GroqLlm;
use crate::infrastructure::vector_store::{LocalVectorStore, QdrantVectorStore};

/// Everything the HTTP layer needs, built once at startup. Construction
/// never aborts the process: components that fail to come up are absent, and
/// the pipeline handle records why.
pub struct InitializedComponents {
    pub pipeline: PipelineHandle,
    pub processor: Option<Arc<DocumentProcessor>>,
    pub vector_store: Option<Arc<dyn VectorStore>>,
}

pub async fn initialize(config: &AppConfig) -> InitializedComponents {
    let store_result = build_vector_store(config).await;
    let embedder_result = build_embedder(&config.embedding);
    let llm_result = build_llm(&config.llm);

    let vector_store = store_result.as_ref().ok().cloned();

    let processor = match (&store_result, &embedder_result) {
        (Ok(store), Ok(embedder)) => {
            info!("document processor loaded");
            Some(Arc::new(DocumentProcessor::new(
                Arc::new(PdfTextExtractor),
                Arc::clone(embedder),
                Arc::clone(store),
                config.document.source.clone(),
                config.document.chunking(),
            )))
        }
        _ => None,
    };

    let pipeline = match (&store_result, &embedder_result, &llm_result) {
        (Ok(store), Ok(embedder), Ok(llm)) => {
            info!("RAG pipeline initialized successfully");
            PipelineHandle::Ready(Arc::new(RagPipeline::new(
                Arc::clone(embedder),
                Arc::clone(store),
                Arc::clone(llm),
                config.prompts.chatbot.system.clone(),
            )))
        }
        _ => {
            let mut reasons = Vec::new();
            if let Err(e) = &store_result {
                reasons.push(format!("vector store: {e}"));
            }
            if let Err(e) = &embedder_result {
                reasons.push(format!("embedding: {e}"));
            }
            if let Err(e) = &llm_result {
                reasons.push(format!("llm: {e}"));
            }
            let reason = reasons.join("; ");
            error!(reason = %reason, "error initializing RAG pipeline");
            PipelineHandle::Failed { reason }
        }
    };

    InitializedComponents {
        pipeline,
        processor,
        vector_store,
    }
}

async fn build_vector_store(config: &AppConfig) -> Result<Arc<dyn VectorStore>, PipelineError> {
    let vs = &config.vector_store;
    match vs.provider.as_str() {
        "qdrant" => {
            let store =
                QdrantVectorStore::new(&vs.qdrant_url, &vs.collection, config.embedding.dimension)
                    .await?;
            Ok(Arc::new(store))
        }
        "local" => {
            let store = LocalVectorStore::open(&vs.path, &vs.collection).await?;
            Ok(Arc::new(store))
        }
        other => Err(PipelineError::initialization(format!(
            "unknown vector store provider: {other}"
        ))),
    }
}

fn build_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingService>, PipelineError> {
    match config.provider.as_str() {
        "openai" => {
            require_env("OPENAI_API_KEY")?;
            Ok(Arc::new(RemoteEmbedding::from_config(config)))
        }
        "local" => Ok(Arc::new(HashedNgramEmbedding::from_config(config))),
        other => Err(PipelineError::initialization(format!(
            "unknown embedding provider: {other}"
        ))),
    }
}

fn build_llm(config: &LlmConfig) -> Result<Arc<dyn LlmService>, PipelineError> {
    require_env("GROQ_API_KEY")?;
    Ok(Arc::new(GroqLlm::from_config(config)))
}

/// The rig provider clients panic when their key variable is missing, so
/// presence is checked before any client is constructed.
fn require_env(key: &str) -> Result<(), PipelineError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(PipelineError::initialization(format!("{key} is not set"))),
    }
}
