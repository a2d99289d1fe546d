use async_trait::async_trait;
use qdrant_client::qdrant::{ScoredPoint, SearchPointsBuilder};
use qdrant_client::{Qdrant, QdrantError};
use tracing::{instrument, warn};

use crate::domain::{ports::VectorStore, DomainError, Embedding, RetrievedDocument};

const CONTENT_FIELD: &str = "content";

// gRPC status codes
const CODE_DEADLINE_EXCEEDED: i32 = 4;
const CODE_RESOURCE_EXHAUSTED: i32 = 8;
const CODE_INTERNAL: i32 = 13;
const CODE_UNAVAILABLE: i32 = 14;

/// Read-only search over an existing Qdrant collection.
///
/// Each point's `content` payload field holds the document text.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
}

impl QdrantVectorStore {
    pub async fn connect(url: &str, collection: &str) -> Result<Self, DomainError> {
        let store = Self::new(url, collection)?;
        store.check_collection().await?;
        Ok(store)
    }

    fn new(url: &str, collection: &str) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    async fn check_collection(&self) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| qdrant_error("qdrant list collections failed", e))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            return Err(DomainError::internal(format!(
                "qdrant collection '{}' does not exist",
                self.collection
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    #[instrument(skip(self, query), fields(collection = %self.collection))]
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, DomainError> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| qdrant_error("qdrant search failed", e))?;

        Ok(response
            .result
            .into_iter()
            .filter_map(point_to_document)
            .collect())
    }
}

/// Points without a string `content` payload are skipped.
fn point_to_document(point: ScoredPoint) -> Option<RetrievedDocument> {
    let Some(content) = point
        .payload
        .get(CONTENT_FIELD)
        .and_then(|value| value.as_str())
    else {
        warn!(id = ?point.id, "qdrant point has no content payload, skipping");
        return None;
    };

    Some(RetrievedDocument::new(content.to_string()).with_score(point.score))
}

/// The client reports a refused connection as an internal status.
fn qdrant_error(context: &str, e: QdrantError) -> DomainError {
    let unavailable = match &e {
        QdrantError::ResponseError { status } => {
            let code = status.code() as i32;
            code == CODE_UNAVAILABLE
                || code == CODE_DEADLINE_EXCEEDED
                || code == CODE_RESOURCE_EXHAUSTED
                || (code == CODE_INTERNAL && status.message().starts_with("Failed to connect"))
        }
        _ => false,
    };

    if unavailable {
        DomainError::unavailable(format!("{context}: {e}"))
    } else {
        DomainError::provider(format!("{context}: {e}"))
    }
}
