mod conversation;
mod document;
mod embedding;

pub use conversation::{format_history, ConversationHistory, PipelineRequest};
pub use document::{combine_documents, RetrievedDocument};
pub use embedding::Embedding;
