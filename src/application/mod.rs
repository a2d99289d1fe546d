//! Application layer - the question answering pipeline.
//!
//! Each stage is a small service over domain ports (traits), so every
//! provider can be swapped for a test double. `QaPipeline` sequences them.

pub mod prompt;
pub mod services;

pub use prompt::PromptTemplate;
pub use services::{AnswerService, QaPipeline, RetrievalService, StandaloneQuestionService};
