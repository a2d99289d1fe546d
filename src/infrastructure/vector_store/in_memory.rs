use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::RwLock;

use crate::domain::{ports::VectorStore, DomainError, Embedding, RetrievedDocument};

/// Brute-force cosine search over documents held in memory.
pub struct InMemoryVectorStore {
    entries: RwLock<Vec<(RetrievedDocument, Embedding)>>,
}

#[derive(Debug, Deserialize)]
struct SeedEntry {
    content: String,
    #[serde(default)]
    metadata: serde_json::Value,
    embedding: Vec<f32>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Loads a JSON array of `{ content, metadata?, embedding }` records.
    pub fn from_json_file(path: &Path) -> Result<Self, DomainError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::internal(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let seed: Vec<SeedEntry> = serde_json::from_str(raw)
            .map_err(|e| DomainError::internal(format!("invalid seed documents: {e}")))?;

        let store = Self::new();
        for entry in seed {
            let document = RetrievedDocument::new(entry.content).with_metadata(entry.metadata);
            store.insert(document, Embedding::new(entry.embedding))?;
        }
        Ok(store)
    }

    pub fn insert(
        &self,
        document: RetrievedDocument,
        embedding: Embedding,
    ) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        entries.push((document, embedding));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        let mut scored: Vec<(f32, &RetrievedDocument)> = entries
            .iter()
            .map(|(document, embedding)| (query.cosine_similarity(embedding), document))
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, document)| document.clone().with_score(score))
            .collect())
    }
}
