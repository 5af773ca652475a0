pub mod bootstrap;
pub mod config;
pub mod embedding;
pub mod extractor;
pub mod llm;
pub mod vector_store;

pub use bootstrap::{initialize, InitializedComponents};
pub use config::{AppConfig, PromptsConfig, SERVICE_NAME};
pub use embedding::{HashedNgramEmbedding, RemoteEmbedding};
pub use extractor::PdfTextExtractor;
pub use llm::GroqLlm;
pub use vector_store::{LocalVectorStore, QdrantVectorStore};
