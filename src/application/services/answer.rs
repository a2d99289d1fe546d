use minijinja::context;
use std::sync::Arc;
use tracing::instrument;

use crate::application::prompt::{PromptTemplate, ANSWER_TEMPLATE};
use crate::domain::{ports::LlmService, DomainError};

/// Generates the final answer from retrieved context and the conversation.
pub struct AnswerService {
    llm: Arc<dyn LlmService>,
    template: PromptTemplate,
}

impl AnswerService {
    pub const VARIABLES: [&'static str; 3] = ["context", "conversation_history", "question"];

    pub fn new(llm: Arc<dyn LlmService>, template: PromptTemplate) -> Self {
        Self { llm, template }
    }

    pub fn with_default_template(llm: Arc<dyn LlmService>) -> Self {
        Self::new(llm, PromptTemplate::new(ANSWER_TEMPLATE))
    }

    #[instrument(skip_all, fields(context_len = context.len(), history_len = history.len()))]
    pub async fn answer(
        &self,
        context: &str,
        history: &str,
        question: &str,
    ) -> Result<String, DomainError> {
        let prompt = self.template.render(context! {
            context,
            conversation_history => history,
            question,
        })?;

        self.llm.complete(&prompt).await
    }
}
