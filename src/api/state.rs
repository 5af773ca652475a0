use std::sync::Arc;

use crate::application::{DocumentProcessor, PipelineHandle};
use crate::domain::ports::VectorStore;
use crate::infrastructure::{AppConfig, InitializedComponents};

/// Shared state handed to every request handler.
///
/// The processor and the vector store are optional on purpose: the service
/// starts even when parts of the stack fail to initialize, and the status
/// endpoint reports each component separately.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: PipelineHandle,
    pub processor: Option<Arc<DocumentProcessor>>,
    pub vector_store: Option<Arc<dyn VectorStore>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(components: InitializedComponents, config: AppConfig) -> Self {
        Self {
            pipeline: components.pipeline,
            processor: components.processor,
            vector_store: components.vector_store,
            config: Arc::new(config),
        }
    }
}
