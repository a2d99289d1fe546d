//! Recording test doubles for the provider ports.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::application::{
    AnswerService, QaPipeline, RetrievalService, StandaloneQuestionService,
};
use crate::domain::{
    ports::{EmbeddingService, LlmService, VectorStore},
    DomainError, Embedding, RetrievedDocument,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Complete(String),
    Embed(String),
    Search(usize),
}

/// Provider calls in the order they happened, shared by all fakes of a test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Complete(prompt) => Some(prompt),
                _ => None,
            })
            .collect()
    }
}

/// Replies to completions in order; errors once the script runs out.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, DomainError>>>,
    log: CallLog,
}

impl ScriptedLlm {
    pub fn new(
        log: &CallLog,
        replies: impl IntoIterator<Item = Result<String, DomainError>>,
    ) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl LlmService for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.log.push(Call::Complete(prompt.to_string()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::internal("no scripted reply left")))
    }
}

pub struct FakeEmbedding {
    log: CallLog,
}

impl FakeEmbedding {
    pub fn new(log: &CallLog) -> Self {
        Self { log: log.clone() }
    }
}

#[async_trait]
impl EmbeddingService for FakeEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.log.push(Call::Embed(text.to_string()));
        Ok(Embedding::new(vec![text.len() as f32, 1.0, 0.0]))
    }
}

pub struct FakeVectorStore {
    documents: Vec<RetrievedDocument>,
    failure: Option<DomainError>,
    log: CallLog,
}

impl FakeVectorStore {
    pub fn new(log: &CallLog, documents: Vec<RetrievedDocument>) -> Self {
        Self {
            documents,
            failure: None,
            log: log.clone(),
        }
    }

    pub fn failing(log: &CallLog, error: DomainError) -> Self {
        Self {
            documents: Vec::new(),
            failure: Some(error),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl VectorStore for FakeVectorStore {
    async fn search(
        &self,
        _query: &Embedding,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, DomainError> {
        self.log.push(Call::Search(top_k));
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self.documents.iter().take(top_k).cloned().collect())
    }
}

/// A pipeline with default prompts over recording fakes.
pub fn pipeline(
    log: &CallLog,
    replies: impl IntoIterator<Item = Result<String, DomainError>>,
    store: FakeVectorStore,
) -> QaPipeline {
    let llm: Arc<dyn LlmService> = Arc::new(ScriptedLlm::new(log, replies));
    QaPipeline::new(
        StandaloneQuestionService::with_default_template(llm.clone()),
        RetrievalService::new(Arc::new(FakeEmbedding::new(log)), Arc::new(store), 6),
        AnswerService::with_default_template(llm),
    )
}
