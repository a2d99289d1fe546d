pub mod config;
pub mod embedding;
pub mod llm;
pub mod telemetry;
pub mod vector_store;

pub use config::{AppConfig, Config, ConfigError, PromptsConfig, Secrets, VectorStoreProvider};
pub use embedding::OpenAiEmbedding;
pub use llm::OpenAiLlm;
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore, SupabaseVectorStore};
