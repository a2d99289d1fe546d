use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::instrument;

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{DomainError, PipelineRequest};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub conversation_history: Option<Vec<String>>,
}

impl TryFrom<AskRequest> for PipelineRequest {
    type Error = DomainError;

    fn try_from(request: AskRequest) -> Result<Self, Self::Error> {
        PipelineRequest::new(
            request.question.unwrap_or_default(),
            request.conversation_history.unwrap_or_default(),
        )
    }
}

/// Answers a question. The body is parsed as JSON whatever its content type.
#[instrument(skip_all)]
pub async fn ask(State(state): State<AppState>, body: Bytes) -> Result<Json<String>, ApiError> {
    let request: AskRequest = serde_json::from_slice(&body)
        .map_err(|e| DomainError::invalid_request(format!("malformed request body: {e}")))?;
    let request = PipelineRequest::try_from(request)?;

    let answer = state.pipeline.run(&request).await?;
    Ok(Json(answer))
}

/// CORS preflight; the headers come from the router's response layers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}
