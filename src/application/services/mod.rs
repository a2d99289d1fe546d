mod answer;
mod pipeline;
mod retrieval;
mod standalone;

#[cfg(test)]
pub(crate) mod fakes;

pub use answer::AnswerService;
pub use pipeline::QaPipeline;
pub use retrieval::{RetrievalService, DEFAULT_TOP_K};
pub use standalone::StandaloneQuestionService;
