//! Conversational question answering over a document store.
//!
//! A question and the prior turns go in; the question is rewritten to stand
//! alone, used to retrieve context from a vector store, and answered by a
//! chat model from that context.

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;
