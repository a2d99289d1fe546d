use tracing::{info, instrument};

use crate::application::services::{AnswerService, RetrievalService, StandaloneQuestionService};
use crate::domain::{DomainError, PipelineRequest};

/// Rewrite, retrieve, answer.
///
/// Stages run strictly one after another and the first error aborts the run.
/// The rewritten question is only used for retrieval; the answer prompt gets
/// the caller's original wording.
pub struct QaPipeline {
    standalone: StandaloneQuestionService,
    retrieval: RetrievalService,
    answer: AnswerService,
}

impl QaPipeline {
    pub fn new(
        standalone: StandaloneQuestionService,
        retrieval: RetrievalService,
        answer: AnswerService,
    ) -> Self {
        Self {
            standalone,
            retrieval,
            answer,
        }
    }

    #[instrument(skip_all, fields(history_messages = request.history.len()))]
    pub async fn run(&self, request: &PipelineRequest) -> Result<String, DomainError> {
        let history = request.history.format();

        let standalone_question = self.standalone.rewrite(&request.question, &history).await?;
        let context = self.retrieval.retrieve(&standalone_question).await?;
        let answer = self
            .answer
            .answer(&context, &history, &request.question)
            .await?;

        info!(answer_len = answer.len(), "question answered");
        Ok(answer)
    }
}
