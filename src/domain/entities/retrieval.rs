use serde::{Deserialize, Serialize};

use super::chunk::ChunkMetadata;

/// Maximum number of characters quoted from a passage in a source attribution.
pub const PREVIEW_MAX_CHARS: usize = 200;

/// Fixed reply served while the pipeline is unavailable (failed construction).
pub const INITIALIZING_MESSAGE: &str =
    "I am currently initializing. Please try again in a moment.";

/// One nearest-neighbor match, produced fresh per query and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub document: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

/// Client-facing citation derived from a retrieved passage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub source: String,
    pub chunk_id: usize,
    pub preview: String,
    pub distance: f32,
}

impl SourceAttribution {
    pub fn from_passage(passage: &RetrievedPassage) -> Self {
        Self {
            source: passage.metadata.source.clone(),
            chunk_id: passage.metadata.chunk_id,
            preview: preview_of(&passage.document),
            distance: passage.distance,
        }
    }
}

/// Truncates to `PREVIEW_MAX_CHARS` characters, appending an ellipsis only
/// when something was cut.
pub fn preview_of(document: &str) -> String {
    if document.chars().count() > PREVIEW_MAX_CHARS {
        let mut preview: String = document.chars().take(PREVIEW_MAX_CHARS).collect();
        preview.push_str("...");
        preview
    } else {
        document.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    MockResponse,
}

/// Result of one full query through the pipeline, before the HTTP layer adds
/// request metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub response: String,
    pub sources: Vec<SourceAttribution>,
    pub status: ResponseStatus,
}

impl QueryOutcome {
    /// Placeholder outcome served while the pipeline is in its failed state.
    /// Same wire shape as a real answer so clients never special-case it.
    pub fn initializing() -> Self {
        Self {
            response: INITIALIZING_MESSAGE.to_string(),
            sources: Vec::new(),
            status: ResponseStatus::MockResponse,
        }
    }
}

/// Summary returned by a full ingest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSummary {
    pub status: String,
    pub total_chunks: usize,
    pub total_characters: usize,
    pub embedding_dimension: usize,
    pub average_chunk_size: f64,
}

impl IngestSummary {
    pub fn new(
        total_chunks: usize,
        total_characters: usize,
        embedding_dimension: usize,
        average_chunk_size: f64,
    ) -> Self {
        Self {
            status: "success".to_string(),
            total_chunks,
            total_characters,
            embedding_dimension,
            average_chunk_size,
        }
    }
}
