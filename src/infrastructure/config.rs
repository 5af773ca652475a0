use std::env;
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

use crate::domain::text::ChunkingConfig;

pub const SERVICE_NAME: &str = "rag-chatbot-api";

const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI assistant specialized in Air Force \
policy and logistics compliance. Answer the user's question based ONLY on the provided \
context. If the answer is not in the context, state that you cannot find the information. \
Do not make up answers.";

/// Everything the service reads from the environment, resolved once at
/// startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub document: DocumentConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub vector_store: VectorStoreConfig,
    pub cors: CorsConfig,
    pub prompts: PromptsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    /// Path of the PDF this service answers questions about.
    pub path: String,
    /// Label written into chunk metadata and echoed back in source citations.
    pub source: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl DocumentConfig {
    /// An overlap at or above the chunk size cannot be honored, so it is
    /// clamped below it.
    pub fn chunking(&self) -> ChunkingConfig {
        let overlap = self.chunk_overlap.min(self.chunk_size.saturating_sub(1));
        if overlap != self.chunk_overlap {
            warn!(
                chunk_size = self.chunk_size,
                chunk_overlap = self.chunk_overlap,
                "chunk overlap clamped below chunk size"
            );
        }
        ChunkingConfig {
            chunk_size: self.chunk_size,
            overlap,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// "local" for the hashed n-gram embedder, "openai" for the hosted model.
    pub provider: String,
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VectorStoreConfig {
    /// "local" for the on-disk store, "qdrant" for a Qdrant server.
    pub provider: String,
    pub collection: String,
    pub path: String,
    pub qdrant_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptsConfig {
    pub chatbot: ChatbotPrompts,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatbotPrompts {
    pub system: String,
}

impl Default for ChatbotPrompts {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl PromptsConfig {
    /// Reads prompt overrides from a YAML file, falling back to the built-in
    /// prompts when the file is absent or malformed.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_yaml::from_str(&raw) {
                Ok(prompts) => prompts,
                Err(e) => {
                    warn!(path, error = %e, "failed to parse prompts file, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let prompts_path = env_or("PROMPTS_PATH", "prompts.yaml");

        Self {
            server: ServerConfig {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: env_parse("PORT", 7860),
                static_dir: env_or("STATIC_DIR", "static"),
            },
            document: DocumentConfig {
                path: env_or("DOCUMENT_PATH", "dafman36-2664.pdf"),
                source: env_or("DOCUMENT_SOURCE", "DAFMAN 36-2664"),
                chunk_size: env_parse("CHUNK_SIZE", 500),
                chunk_overlap: env_parse("CHUNK_OVERLAP", 100),
            },
            embedding: EmbeddingConfig {
                provider: env_or("EMBEDDING_PROVIDER", "local"),
                model: env_or("EMBEDDING_MODEL", "text-embedding-3-small"),
                dimension: env_parse("EMBEDDING_DIMENSION", 384),
            },
            llm: LlmConfig {
                model: env_or("GROQ_MODEL", "llama3-8b-8192"),
                temperature: env_parse("LLM_TEMPERATURE", 0.7),
                max_tokens: env_parse("LLM_MAX_TOKENS", 512),
            },
            vector_store: VectorStoreConfig {
                provider: env_or("VECTOR_STORE_PROVIDER", "local"),
                collection: env_or("COLLECTION_NAME", "dafman_documents"),
                path: env_or("VECTOR_STORE_PATH", "./vector_store"),
                qdrant_url: env_or("QDRANT_URL", "http://localhost:6334"),
            },
            cors: CorsConfig {
                allowed_origins: env_list("CORS_ALLOWED_ORIGINS"),
            },
            prompts: PromptsConfig::load(&prompts_path),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 7860,
                static_dir: "static".to_string(),
            },
            document: DocumentConfig {
                path: "dafman36-2664.pdf".to_string(),
                source: "DAFMAN 36-2664".to_string(),
                chunk_size: 500,
                chunk_overlap: 100,
            },
            embedding: EmbeddingConfig {
                provider: "local".to_string(),
                model: "text-embedding-3-small".to_string(),
                dimension: 384,
            },
            llm: LlmConfig {
                model: "llama3-8b-8192".to_string(),
                temperature: 0.7,
                max_tokens: 512,
            },
            vector_store: VectorStoreConfig {
                provider: "local".to_string(),
                collection: "dafman_documents".to_string(),
                path: "./vector_store".to_string(),
                qdrant_url: "http://localhost:6334".to_string(),
            },
            cors: CorsConfig {
                allowed_origins: Vec::new(),
            },
            prompts: PromptsConfig::default(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
