use std::path::Path;

use crate::domain::errors::PipelineError;

/// Pulls raw text out of a source document. Implementations are synchronous;
/// callers run them on a blocking thread.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, PipelineError>;
}
