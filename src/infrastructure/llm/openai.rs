use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::{CompletionError, Prompt, PromptError};
use rig::providers::openai;
use tracing::instrument;

use crate::domain::{ports::LlmService, DomainError};

/// Chat completions through OpenAI.
///
/// The client is built once and reused; `OPENAI_API_KEY` must be set.
pub struct OpenAiLlm {
    client: openai::Client,
    model: String,
}

impl OpenAiLlm {
    pub fn from_env(model: impl Into<String>) -> Self {
        Self {
            client: openai::Client::from_env(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl LlmService for OpenAiLlm {
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        let agent = self.client.agent(&self.model).build();
        agent
            .prompt(prompt)
            .await
            .map_err(completion_error)
    }
}

/// Transport failures are retryable; anything OpenAI answered is not.
fn completion_error(e: PromptError) -> DomainError {
    match e {
        PromptError::CompletionError(CompletionError::HttpError(e)) => {
            DomainError::unavailable(format!("openai unreachable: {e}"))
        }
        e => DomainError::provider(format!("completion failed: {e}")),
    }
}
