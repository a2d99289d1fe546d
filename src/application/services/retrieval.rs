use std::sync::Arc;
use tracing::{debug, instrument};

use crate::domain::{
    combine_documents,
    ports::{EmbeddingService, VectorStore},
    DomainError, RetrievedDocument,
};

pub const DEFAULT_TOP_K: usize = 6;

pub struct RetrievalService {
    embedding: Arc<dyn EmbeddingService>,
    vector_store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl RetrievalService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        vector_store: Arc<dyn VectorStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedding,
            vector_store,
            top_k,
        }
    }

    /// Embeds `query` and returns the nearest documents, most similar first.
    #[instrument(skip(self), fields(top_k = self.top_k))]
    pub async fn search(&self, query: &str) -> Result<Vec<RetrievedDocument>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        let documents = self.vector_store.search(&embedding, self.top_k).await?;
        debug!(count = documents.len(), "documents retrieved");
        Ok(documents)
    }

    /// Retrieves documents for `query` and combines them into one context block.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<String, DomainError> {
        let documents = self.search(query).await?;
        Ok(combine_documents(&documents))
    }
}
