use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::groq;

use crate::domain::{ports::LlmService, PipelineError};
use crate::infrastructure::config::LlmConfig;

/// Chat completions through the Groq API. The bootstrap checks
/// `GROQ_API_KEY` is set before constructing this.
pub struct GroqLlm {
    client: groq::Client,
    model: String,
    temperature: f64,
    max_tokens: u64,
}

impl GroqLlm {
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            client: groq::Client::from_env(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl LlmService for GroqLlm {
    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, PipelineError> {
        let agent = self
            .client
            .agent(&self.model)
            .preamble(system)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        agent
            .prompt(prompt)
            .await
            .map_err(|e| PipelineError::generation(e.to_string()))
    }
}
