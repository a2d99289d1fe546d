use crate::domain::{errors::DomainError, Embedding, RetrievedDocument};
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Returns at most `top_k` documents, most similar first.
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, DomainError>;
}
