use minijinja::context;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::application::prompt::{PromptTemplate, STANDALONE_QUESTION_TEMPLATE};
use crate::domain::{ports::LlmService, DomainError};

/// Rewrites a follow-up question so it can be understood without the conversation.
pub struct StandaloneQuestionService {
    llm: Arc<dyn LlmService>,
    template: PromptTemplate,
}

impl StandaloneQuestionService {
    pub const VARIABLES: [&'static str; 2] = ["question", "conversation_history"];

    pub fn new(llm: Arc<dyn LlmService>, template: PromptTemplate) -> Self {
        Self { llm, template }
    }

    pub fn with_default_template(llm: Arc<dyn LlmService>) -> Self {
        Self::new(llm, PromptTemplate::new(STANDALONE_QUESTION_TEMPLATE))
    }

    #[instrument(skip_all, fields(question_len = question.len(), history_len = history.len()))]
    pub async fn rewrite(&self, question: &str, history: &str) -> Result<String, DomainError> {
        let prompt = self.template.render(context! {
            question,
            conversation_history => history,
        })?;

        let standalone = self.llm.complete(&prompt).await?;
        debug!(standalone_question = %standalone, "question rewritten");
        Ok(standalone)
    }
}
