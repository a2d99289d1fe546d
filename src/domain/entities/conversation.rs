use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

const HUMAN_LABEL: &str = "Human: ";
const EXPERT_LABEL: &str = "Expert: ";

/// Prior turns of a conversation, oldest first.
///
/// Roles are positional: even indices are the human, odd indices the expert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory(Vec<String>);

impl ConversationHistory {
    pub fn new(messages: Vec<String>) -> Self {
        Self(messages)
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders the history as a labeled transcript, one message per line.
    pub fn format(&self) -> String {
        format_history(&self.0)
    }
}

impl From<Vec<String>> for ConversationHistory {
    fn from(messages: Vec<String>) -> Self {
        Self(messages)
    }
}

/// Labels each message by its position and joins them with newlines.
pub fn format_history<S: AsRef<str>>(messages: &[S]) -> String {
    messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let label = if i % 2 == 0 { HUMAN_LABEL } else { EXPERT_LABEL };
            format!("{label}{}", message.as_ref())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub question: String,
    pub history: ConversationHistory,
}

impl PipelineRequest {
    /// Builds a request, rejecting a blank question.
    pub fn new(
        question: impl Into<String>,
        history: impl Into<ConversationHistory>,
    ) -> Result<Self, DomainError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(DomainError::invalid_request("question must not be empty"));
        }

        Ok(Self {
            question,
            history: history.into(),
        })
    }
}
