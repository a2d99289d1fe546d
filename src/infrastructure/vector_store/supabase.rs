use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::domain::{ports::VectorStore, DomainError, Embedding, RetrievedDocument};

const UNREADABLE_BODY: &str = "<unreadable body>";

/// Similarity search through a Supabase (PostgREST) RPC function.
///
/// The function is called as `{project_url}/rest/v1/rpc/{query_name}` with
/// `query_embedding`, `match_count` and `filter` arguments and must return
/// rows with a `content` column.
pub struct SupabaseVectorStore {
    http: reqwest::Client,
    rpc_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
    filter: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MatchRow {
    content: String,
    #[serde(default)]
    metadata: serde_json::Value,
    #[serde(default)]
    similarity: Option<f32>,
}

impl From<MatchRow> for RetrievedDocument {
    fn from(row: MatchRow) -> Self {
        let document = RetrievedDocument::new(row.content).with_metadata(row.metadata);
        match row.similarity {
            Some(score) => document.with_score(score),
            None => document,
        }
    }
}

impl SupabaseVectorStore {
    pub fn new(
        project_url: &str,
        api_key: impl Into<String>,
        query_name: &str,
    ) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| DomainError::internal(e.to_string()))?;

        Ok(Self {
            http,
            rpc_url: format!(
                "{}/rest/v1/rpc/{}",
                project_url.trim_end_matches('/'),
                query_name
            ),
            api_key: api_key.into(),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait]
impl VectorStore for SupabaseVectorStore {
    #[instrument(skip(self, query), fields(rpc = %self.rpc_url))]
    async fn search(
        &self,
        query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, DomainError> {
        let body = MatchRequest {
            query_embedding: query.as_slice(),
            match_count: top_k,
            filter: serde_json::json!({}),
        };

        let response = self
            .http
            .post(&self.rpc_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|e| {
                warn!(error = %e, "failed to read supabase error body");
                UNREADABLE_BODY.to_string()
            });
            warn!(status = status.as_u16(), detail = %detail, "supabase rpc failed");
            return Err(status_error(status, &detail));
        }

        let rows: Vec<MatchRow> = response
            .json()
            .await
            .map_err(|e| DomainError::provider(format!("invalid supabase response: {e}")))?;

        Ok(rows.into_iter().take(top_k).map(Into::into).collect())
    }
}

fn transport_error(e: reqwest::Error) -> DomainError {
    if e.is_connect() || e.is_timeout() {
        DomainError::unavailable(format!("supabase unreachable: {e}"))
    } else {
        DomainError::provider(format!("supabase request failed: {e}"))
    }
}

fn status_error(status: StatusCode, detail: &str) -> DomainError {
    let msg = format!("supabase returned {status}: {detail}");
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        DomainError::unavailable(msg)
    } else {
        DomainError::provider(msg)
    }
}
