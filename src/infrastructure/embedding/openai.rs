use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::{EmbeddingError, EmbeddingsBuilder};
use rig::providers::openai;
use tracing::instrument;

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

pub struct OpenAiEmbedding {
    client: openai::Client,
    model: String,
    dimension: usize,
}

impl OpenAiEmbedding {
    pub fn from_env(config: &EmbeddingConfig) -> Self {
        Self {
            client: openai::Client::from_env(),
            model: config.model.clone(),
            dimension: config.dimension,
        }
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbedding {
    #[instrument(skip_all, fields(model = %self.model, text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        let model = self.client.embedding_model(&self.model);

        let embeddings = EmbeddingsBuilder::new(model)
            .document(text.to_string())
            .map_err(|e| DomainError::provider(e.to_string()))?
            .build()
            .await
            .map_err(embedding_error)?;

        let embedding = embeddings
            .into_iter()
            .next()
            .map(|(_text, emb)| Embedding::from_f64(emb.first().vec))
            .ok_or_else(|| DomainError::provider("no embedding returned"))?;

        if embedding.dimension() != self.dimension {
            return Err(DomainError::provider(format!(
                "expected a {}-dimension embedding, got {}",
                self.dimension,
                embedding.dimension()
            )));
        }

        Ok(embedding)
    }
}

fn embedding_error(e: EmbeddingError) -> DomainError {
    match e {
        EmbeddingError::HttpError(e) => DomainError::unavailable(format!("openai unreachable: {e}")),
        e => DomainError::provider(format!("embedding failed: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        std::env::set_var("OPENAI_API_KEY", "test-key");
        std::env::set_var("OPENAI_BASE_URL", format!("http://{addr}/v1"));
        let service = OpenAiEmbedding::from_env(&EmbeddingConfig::default());

        let err = service.embed("hello").await.unwrap_err();

        assert!(matches!(err, DomainError::ProviderUnavailable(_)), "{err:?}");
    }

    #[test]
    fn test_non_transport_errors_are_provider_errors() {
        let err = embedding_error(EmbeddingError::ProviderError("quota exceeded".to_string()));
        assert!(matches!(err, DomainError::Provider(_)), "{err:?}");
        assert!(err.to_string().contains("quota exceeded"));
    }
}
