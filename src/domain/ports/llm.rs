use crate::domain::errors::DomainError;
use async_trait::async_trait;

/// A chat completion provider: one rendered prompt in, generated text out.
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError>;
}
