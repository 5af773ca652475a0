use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{
    ports::{EmbeddingService, TextExtractor, VectorStore},
    text::{chunk_text, normalize_text, ChunkingConfig},
    IngestSummary, PipelineError,
};

/// Ingest side of the pipeline: extract, normalize, chunk, embed, store.
/// Each run replaces the collection wholesale, so reprocessing never leaves
/// stale points behind.
pub struct DocumentProcessor {
    extractor: Arc<dyn TextExtractor>,
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    source_label: String,
    chunking: ChunkingConfig,
}

impl DocumentProcessor {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        source_label: impl Into<String>,
        chunking: ChunkingConfig,
    ) -> Self {
        Self {
            extractor,
            embedding,
            vector_store,
            source_label: source_label.into(),
            chunking,
        }
    }

    #[instrument(skip(self), fields(run_id = %Uuid::new_v4(), path = %path.display()))]
    pub async fn process_document(&self, path: &Path) -> Result<IngestSummary, PipelineError> {
        info!("extracting text");
        let extractor = Arc::clone(&self.extractor);
        let owned = path.to_path_buf();
        let raw = tokio::task::spawn_blocking(move || extractor.extract(&owned))
            .await
            .map_err(|e| PipelineError::internal(format!("extraction task failed: {e}")))??;

        if raw.trim().is_empty() {
            return Err(PipelineError::extraction("Could not extract text from PDF."));
        }

        let normalized = normalize_text(&raw);
        let chunks = chunk_text(&normalized, &self.source_label, &self.chunking);
        info!(total_chunks = chunks.len(), "chunked document");

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            info!("generating embeddings for chunks");
            self.embedding.embed_batch(&texts).await?
        };

        self.vector_store.reset().await?;
        if !chunks.is_empty() {
            self.vector_store.upsert(&chunks, &embeddings).await?;
        }
        info!(stored = chunks.len(), "stored documents in vector database");

        let total_characters = normalized.chars().count();
        let average_chunk_size = if chunks.is_empty() {
            0.0
        } else {
            chunks.iter().map(|c| c.metadata.length).sum::<usize>() as f64 / chunks.len() as f64
        };

        Ok(IngestSummary::new(
            chunks.len(),
            total_characters,
            self.embedding.dimension(),
            average_chunk_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Chunk, Embedding, RetrievedPassage};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedExtractor {
        text: String,
    }

    impl TextExtractor for FixedExtractor {
        fn extract(&self, _path: &Path) -> Result<String, PipelineError> {
            Ok(self.text.clone())
        }
    }

    struct CountingEmbedder;

    #[async_trait]
    impl EmbeddingService for CountingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Embedding, PipelineError> {
            Ok(Embedding::new(vec![0.0; 4]))
        }

        async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, PipelineError> {
            Ok(texts.iter().map(|_| Embedding::new(vec![0.0; 4])).collect())
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        resets: Mutex<usize>,
        upserted: Mutex<Vec<Chunk>>,
    }

    #[async_trait]
    impl VectorStore for RecordingStore {
        async fn reset(&self) -> Result<(), PipelineError> {
            *self.resets.lock().unwrap() += 1;
            self.upserted.lock().unwrap().clear();
            Ok(())
        }

        async fn upsert(
            &self,
            chunks: &[Chunk],
            _embeddings: &[Embedding],
        ) -> Result<(), PipelineError> {
            self.upserted.lock().unwrap().extend_from_slice(chunks);
            Ok(())
        }

        async fn query(
            &self,
            _embedding: &Embedding,
            _top_k: usize,
        ) -> Result<Vec<RetrievedPassage>, PipelineError> {
            Ok(Vec::new())
        }

        async fn count(&self) -> Result<Option<u64>, PipelineError> {
            Ok(Some(self.upserted.lock().unwrap().len() as u64))
        }
    }

    fn processor(text: &str, store: Arc<RecordingStore>) -> DocumentProcessor {
        DocumentProcessor::new(
            Arc::new(FixedExtractor {
                text: text.to_string(),
            }),
            Arc::new(CountingEmbedder),
            store,
            "DAFMAN 36-2664",
            ChunkingConfig::default(),
        )
    }

    #[tokio::test]
    async fn processing_resets_then_stores_all_chunks() {
        let store = Arc::new(RecordingStore::default());
        let words: Vec<String> = (0..400).map(|i| format!("word{i}")).collect();
        let p = processor(&words.join(" "), Arc::clone(&store));

        let summary = p.process_document(Path::new("doc.pdf")).await.unwrap();

        assert_eq!(*store.resets.lock().unwrap(), 1);
        let upserted = store.upserted.lock().unwrap();
        assert_eq!(upserted.len(), summary.total_chunks);
        assert!(summary.total_chunks > 1);
        assert_eq!(upserted[0].id, "chunk_0");
        assert_eq!(upserted[0].metadata.source, "DAFMAN 36-2664");
    }

    #[tokio::test]
    async fn summary_reports_normalized_totals() {
        let store = Arc::new(RecordingStore::default());
        let p = processor("alpha   beta\n\ngamma", Arc::clone(&store));

        let summary = p.process_document(Path::new("doc.pdf")).await.unwrap();

        // Normalizes to "alpha beta gamma", 16 chars in one chunk.
        assert_eq!(summary.status, "success");
        assert_eq!(summary.total_chunks, 1);
        assert_eq!(summary.total_characters, 16);
        assert_eq!(summary.embedding_dimension, 4);
        assert!((summary.average_chunk_size - 16.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn blank_extraction_is_an_error() {
        let store = Arc::new(RecordingStore::default());
        let p = processor("  \n  ", Arc::clone(&store));

        let err = p.process_document(Path::new("doc.pdf")).await.unwrap_err();

        assert!(matches!(err, PipelineError::Extraction(_)));
        assert_eq!(*store.resets.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn boilerplate_only_document_yields_empty_summary() {
        let store = Arc::new(RecordingStore::default());
        let p = processor("Page 1 of 2 DAFMAN 36-2664", Arc::clone(&store));

        let summary = p.process_document(Path::new("doc.pdf")).await.unwrap();

        assert_eq!(summary.total_chunks, 0);
        assert_eq!(summary.average_chunk_size, 0.0);
        assert_eq!(*store.resets.lock().unwrap(), 1);
        assert!(store.upserted.lock().unwrap().is_empty());
    }
}
