use std::path::PathBuf;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{ports::VectorStore, Chunk, Embedding, PipelineError, RetrievedPassage};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredPoint {
    chunk: Chunk,
    embedding: Embedding,
}

#[derive(Serialize)]
struct PersistedState<'a> {
    version: u32,
    collection: &'a str,
    points: &'a [StoredPoint],
}

#[derive(Deserialize)]
struct LoadedState {
    version: u32,
    #[allow(dead_code)]
    collection: String,
    points: Vec<StoredPoint>,
}

/// On-disk vector store: one JSON file per collection. Similarity search is
/// exhaustive, which is fine at the scale of a single chunked document.
///
/// `None` in the points slot means the collection has never been created,
/// which the status endpoint reports distinctly from an empty collection.
pub struct LocalVectorStore {
    file: PathBuf,
    collection: String,
    points: RwLock<Option<Vec<StoredPoint>>>,
}

impl LocalVectorStore {
    pub async fn open(dir: &str, collection: &str) -> Result<Self, PipelineError> {
        let file = PathBuf::from(dir).join(format!("{collection}.json"));

        let exists = tokio::fs::try_exists(&file)
            .await
            .map_err(|e| PipelineError::vector_store(e.to_string()))?;

        let points = if exists {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .map_err(|e| PipelineError::vector_store(e.to_string()))?;

            match serde_json::from_str::<LoadedState>(&raw) {
                Ok(state) if state.version == FORMAT_VERSION => {
                    debug!(collection, points = state.points.len(), "loaded collection");
                    Some(state.points)
                }
                Ok(state) => {
                    warn!(
                        collection,
                        version = state.version,
                        "unsupported collection format, starting empty"
                    );
                    Some(Vec::new())
                }
                Err(e) => {
                    return Err(PipelineError::vector_store(format!(
                        "corrupt collection file {}: {e}",
                        file.display()
                    )));
                }
            }
        } else {
            None
        };

        Ok(Self {
            file,
            collection: collection.to_string(),
            points: RwLock::new(points),
        })
    }

    async fn persist(&self) -> Result<(), PipelineError> {
        let data = {
            let guard = self
                .points
                .read()
                .map_err(|e| PipelineError::internal(e.to_string()))?;
            let points = match guard.as_ref() {
                Some(points) => points,
                None => return Ok(()),
            };
            serde_json::to_string(&PersistedState {
                version: FORMAT_VERSION,
                collection: &self.collection,
                points,
            })
            .map_err(|e| PipelineError::vector_store(e.to_string()))?
        };

        if let Some(parent) = self.file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::vector_store(e.to_string()))?;
        }
        tokio::fs::write(&self.file, data)
            .await
            .map_err(|e| PipelineError::vector_store(e.to_string()))
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn reset(&self) -> Result<(), PipelineError> {
        {
            let mut guard = self
                .points
                .write()
                .map_err(|e| PipelineError::internal(e.to_string()))?;
            *guard = Some(Vec::new());
        }
        self.persist().await
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

        {
            let mut guard = self
                .points
                .write()
                .map_err(|e| PipelineError::internal(e.to_string()))?;
            let points = guard.get_or_insert_with(Vec::new);

            for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
                points.retain(|p| p.chunk.metadata.chunk_id != chunk.metadata.chunk_id);
                points.push(StoredPoint {
                    chunk: chunk.clone(),
                    embedding: embedding.clone(),
                });
            }
        }
        self.persist().await
    }

    async fn query(
        &self,
        embedding: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedPassage>, PipelineError> {
        let guard = self
            .points
            .read()
            .map_err(|e| PipelineError::internal(e.to_string()))?;
        let points = match guard.as_ref() {
            Some(points) => points,
            None => return Ok(Vec::new()),
        };

        let mut results: Vec<RetrievedPassage> = points
            .iter()
            .map(|p| RetrievedPassage {
                document: p.chunk.text.clone(),
                metadata: p.chunk.metadata.clone(),
                distance: embedding.distance(&p.embedding),
            })
            .collect();

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        Ok(results)
    }

    async fn count(&self) -> Result<Option<u64>, PipelineError> {
        let guard = self
            .points
            .read()
            .map_err(|e| PipelineError::internal(e.to_string()))?;
        Ok(guard.as_ref().map(|points| points.len() as u64))
    }
}
