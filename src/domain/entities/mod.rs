mod chunk;
mod embedding;
mod retrieval;

pub use chunk::{Chunk, ChunkMetadata, ABSENT_FIELD};
pub use embedding::Embedding;
pub use retrieval::{
    preview_of, IngestSummary, QueryOutcome, ResponseStatus, RetrievedPassage,
    SourceAttribution, INITIALIZING_MESSAGE, PREVIEW_MAX_CHARS,
};
