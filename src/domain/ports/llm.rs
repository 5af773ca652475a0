use crate::domain::errors::PipelineError;
use async_trait::async_trait;

#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, PipelineError>;
}
