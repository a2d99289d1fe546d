use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::{
    AnswerService, PromptTemplate, QaPipeline, RetrievalService, StandaloneQuestionService,
};
use crate::domain::ports::{EmbeddingService, LlmService, VectorStore};
use crate::infrastructure::{
    AppConfig, InMemoryVectorStore, OpenAiEmbedding, OpenAiLlm, QdrantVectorStore, Secrets,
    SupabaseVectorStore, VectorStoreProvider,
};

const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QaPipeline>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pipeline: QaPipeline, config: AppConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
        }
    }

    /// Builds every provider client once and wires them into the pipeline.
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        Secrets::require(&config.secrets.openai_api_key, "OPENAI_API_KEY")?;

        let llm: Arc<dyn LlmService> =
            Arc::new(OpenAiLlm::from_env(config.config.llm.model.clone()));
        let embedding: Arc<dyn EmbeddingService> =
            Arc::new(OpenAiEmbedding::from_env(&config.config.embedding));
        let vector_store = build_vector_store(&config).await?;

        let standalone_template = PromptTemplate::with_variables(
            config.prompts.standalone_question.clone(),
            &StandaloneQuestionService::VARIABLES,
        )
        .context("invalid standalone_question prompt")?;
        let answer_template = PromptTemplate::with_variables(
            config.prompts.answer.clone(),
            &AnswerService::VARIABLES,
        )
        .context("invalid answer prompt")?;

        let pipeline = QaPipeline::new(
            StandaloneQuestionService::new(llm.clone(), standalone_template),
            RetrievalService::new(embedding, vector_store, config.config.rag.top_k),
            AnswerService::new(llm, answer_template),
        );

        info!(
            model = %config.config.llm.model,
            embedding_model = %config.config.embedding.model,
            top_k = config.config.rag.top_k,
            "pipeline initialized"
        );

        Ok(Self::new(pipeline, config))
    }
}

async fn build_vector_store(config: &AppConfig) -> anyhow::Result<Arc<dyn VectorStore>> {
    let store_config = &config.config.vector_store;

    let store: Arc<dyn VectorStore> = match store_config.provider {
        VectorStoreProvider::Supabase => {
            let url =
                Secrets::require(&config.secrets.supabase_project_url, "SUPABASE_PROJECT_URL")?;
            let key = Secrets::require(&config.secrets.supabase_api_key, "SUPABASE_API_KEY")?;
            Arc::new(SupabaseVectorStore::new(
                &url,
                key,
                &store_config.supabase.query_name,
            )?)
        }
        VectorStoreProvider::Qdrant => {
            let url = config
                .secrets
                .qdrant_url
                .clone()
                .unwrap_or_else(|| DEFAULT_QDRANT_URL.into());
            Arc::new(
                QdrantVectorStore::connect(&url, &store_config.qdrant.collection)
                    .await
                    .context("failed to connect to qdrant")?,
            )
        }
        VectorStoreProvider::Memory => {
            let store = match &store_config.memory.seed_file {
                Some(path) => InMemoryVectorStore::from_json_file(path)?,
                None => InMemoryVectorStore::new(),
            };
            if store.is_empty() {
                warn!("in-memory vector store has no documents, every context will be empty");
            } else {
                info!(documents = store.len(), "in-memory vector store seeded");
            }
            Arc::new(store)
        }
    };

    info!(provider = ?store_config.provider, "vector store ready");
    Ok(store)
}
