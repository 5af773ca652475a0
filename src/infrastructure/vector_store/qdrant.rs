use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};

use crate::domain::{
    ports::VectorStore, Chunk, ChunkMetadata, Embedding, PipelineError, RetrievedPassage,
};

/// Qdrant-backed store. Points are keyed by the numeric chunk index, so
/// re-ingesting the same document overwrites rather than duplicates.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantVectorStore {
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, PipelineError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| PipelineError::vector_store(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };

        store.ensure_collection().await?;

        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), PipelineError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| PipelineError::vector_store(e.to_string()))?;

        if !exists {
            self.create_collection().await?;
        }

        Ok(())
    }

    async fn create_collection(&self) -> Result<(), PipelineError> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                ),
            )
            .await
            .map_err(|e| PipelineError::vector_store(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn reset(&self) -> Result<(), PipelineError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| PipelineError::vector_store(e.to_string()))?;

        if exists {
            self.client
                .delete_collection(&self.collection)
                .await
                .map_err(|e| PipelineError::vector_store(e.to_string()))?;
        }

        self.create_collection().await
    }

    async fn upsert(
        &self,
        chunks: &[Chunk],
        embeddings: &[Embedding],
    ) -> Result<(), PipelineError> {
        if chunks.len() != embeddings.len() {
            return Err(PipelineError::vector_store(
                "chunk and embedding counts differ",
            ));
        }
        if chunks.is_empty() {
            return Ok(());
        }

        let mut points = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            let payload: Payload = serde_json::json!({
                "document": chunk.text,
                "source": chunk.metadata.source,
                "chunk_id": chunk.metadata.chunk_id,
                "length": chunk.metadata.length,
                "page_number": chunk.metadata.page_number_label(),
            })
            .try_into()
            .map_err(|_| PipelineError::internal("failed to create payload"))?;

            points.push(PointStruct::new(
                chunk.metadata.chunk_id as u64,
                embedding.as_slice().to_vec(),
                payload,
            ));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| PipelineError::vector_store(e.to_string()))?;

        Ok(())
    }

    async fn query(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, PipelineError> {
        let results = self
            .client
            .search_points(
                SearchPointsBuilder::new(
                    &self.collection,
                    embedding.as_slice().to_vec(),
                    top_k as u64,
                )
                .with_payload(true),
            )
            .await
            .map_err(|e| PipelineError::vector_store(e.to_string()))?;

        Ok(results
            .result
            .into_iter()
            .filter_map(|point| passage_from_payload(&point.payload, point.score))
            .collect())
    }

    async fn count(&self) -> Result<Option<u64>, PipelineError> {
        let exists = self
            .client
            .collection_exists(&self.collection)
            .await
            .map_err(|e| PipelineError::vector_store(e.to_string()))?;

        if !exists {
            return Ok(None);
        }

        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| PipelineError::vector_store(e.to_string()))?;

        Ok(Some(response.result.map(|r| r.count).unwrap_or(0)))
    }
}

/// Rehydrates one scored point into a passage. Points written by other
/// tooling may be missing fields; those are skipped rather than failing
/// the whole query.
fn passage_from_payload(
    payload: &HashMap<String, Value>,
    score: f32,
) -> Option<RetrievedPassage> {
    let document = payload.get("document")?.as_str()?.to_string();
    let chunk_id = payload.get("chunk_id")?.as_integer()? as usize;
    let source = payload.get("source")?.as_str()?.to_string();
    let length = payload.get("length")?.as_integer()? as usize;
    let page_number = payload
        .get("page_number")
        .and_then(|v| v.as_str())
        .and_then(|label| ChunkMetadata::parse_page_label(label));

    Some(RetrievedPassage {
        document,
        metadata: ChunkMetadata {
            chunk_id,
            source,
            length,
            page_number,
        },
        // Qdrant reports cosine similarity; the wire contract is a
        // distance that ascends as relevance drops.
        distance: 1.0 - score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_with_page(page: &str) -> HashMap<String, Value> {
        let mut payload = HashMap::new();
        payload.insert("document".to_string(), "awards are announced".into());
        payload.insert("source".to_string(), "DAFMAN 36-2664".into());
        payload.insert("chunk_id".to_string(), 2i64.into());
        payload.insert("length".to_string(), 20i64.into());
        payload.insert("page_number".to_string(), page.into());
        payload
    }

    #[test]
    fn payload_rehydrates_into_a_passage() {
        let passage = passage_from_payload(&payload_with_page("14"), 0.9).unwrap();

        assert_eq!(passage.document, "awards are announced");
        assert_eq!(passage.metadata.chunk_id, 2);
        assert_eq!(passage.metadata.source, "DAFMAN 36-2664");
        assert_eq!(passage.metadata.length, 20);
        assert_eq!(passage.metadata.page_number, Some("14".to_string()));
        assert!((passage.distance - 0.1).abs() < 1e-6);
    }

    #[test]
    fn placeholder_page_number_reads_back_as_absent() {
        let passage = passage_from_payload(&payload_with_page("N/A"), 1.0).unwrap();

        assert_eq!(passage.metadata.page_number, None);
    }

    #[test]
    fn incomplete_payload_is_skipped() {
        let mut payload = payload_with_page("N/A");
        payload.remove("document");

        assert!(passage_from_payload(&payload, 0.5).is_none());
    }
}
