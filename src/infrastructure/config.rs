use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::application::prompt::{ANSWER_TEMPLATE, STANDALONE_QUESTION_TEMPLATE};
use crate::application::services::DEFAULT_TOP_K;

pub const CONFIG_FILE: &str = "config.yaml";
pub const PROMPTS_FILE: &str = "prompts.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub rag: RagConfig,
    pub vector_store: VectorStoreConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            dimension: 1536,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorStoreProvider {
    #[default]
    Supabase,
    Qdrant,
    Memory,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub provider: VectorStoreProvider,
    pub supabase: SupabaseConfig,
    pub qdrant: QdrantConfig,
    pub memory: MemoryStoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    /// Postgres function called through `/rest/v1/rpc/`.
    pub query_name: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            query_name: "match_cloud_native_spring_documents".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    pub collection: String,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            collection: "cloud_native_spring_documents".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemoryStoreConfig {
    /// JSON array of `{ content, metadata?, embedding }` loaded at startup.
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allow_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub standalone_question: String,
    pub answer: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            standalone_question: STANDALONE_QUESTION_TEMPLATE.to_string(),
            answer: ANSWER_TEMPLATE.to_string(),
        }
    }
}

/// Credentials and endpoints that only ever come from the environment.
#[derive(Clone, Default)]
pub struct Secrets {
    pub openai_api_key: Option<String>,
    pub supabase_project_url: Option<String>,
    pub supabase_api_key: Option<String>,
    pub qdrant_url: Option<String>,
}

impl Secrets {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: get("OPENAI_API_KEY"),
            supabase_project_url: get("SUPABASE_PROJECT_URL"),
            supabase_api_key: get("SUPABASE_API_KEY"),
            qdrant_url: get("QDRANT_URL"),
        }
    }

    pub fn require(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
        value.clone().ok_or(ConfigError::MissingEnv(name))
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Secrets")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("supabase_project_url", &self.supabase_project_url)
            .field("supabase_api_key", &redact(&self.supabase_api_key))
            .field("qdrant_url", &self.qdrant_url)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub config: Config,
    pub prompts: PromptsConfig,
    pub secrets: Secrets,
}

impl AppConfig {
    /// Loads YAML files from `CONFIG_DIR` (default `config`), then applies
    /// environment overrides. Missing files fall back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into());
        Self::load_from(Path::new(&dir), |key| std::env::var(key).ok())
    }

    pub fn load_from(
        dir: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let config_yaml = read_optional(&dir.join(CONFIG_FILE))?;
        let prompts_yaml = read_optional(&dir.join(PROMPTS_FILE))?;

        let mut app = Self::from_yaml(config_yaml.as_deref(), prompts_yaml.as_deref())?;
        app.apply_env(lookup)?;
        Ok(app)
    }

    pub fn from_yaml(
        config_yaml: Option<&str>,
        prompts_yaml: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            config: parse_yaml(CONFIG_FILE, config_yaml)?,
            prompts: parse_yaml(PROMPTS_FILE, prompts_yaml)?,
            secrets: Secrets::default(),
        })
    }

    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("SERVER_HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.config.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("SERVER_PORT is not a port: {port}")))?;
        }
        self.secrets = Secrets::from_lookup(lookup);
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.config.rag.top_k == 0 {
            return Err(ConfigError::Invalid("rag.top_k must be at least 1".into()));
        }
        if self.config.embedding.dimension == 0 {
            return Err(ConfigError::Invalid(
                "embedding.dimension must be at least 1".into(),
            ));
        }
        if axum::http::HeaderValue::from_str(&self.config.cors.allow_origin).is_err() {
            return Err(ConfigError::Invalid(format!(
                "cors.allow_origin is not a valid header value: {:?}",
                self.config.cors.allow_origin
            )));
        }
        Ok(())
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_yaml<T>(name: &str, yaml: Option<&str>) -> Result<T, ConfigError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    match yaml {
        Some(yaml) if !yaml.trim().is_empty() => {
            serde_yaml::from_str(yaml).map_err(|source| ConfigError::Parse {
                name: name.to_string(),
                source,
            })
        }
        _ => Ok(T::default()),
    }
}
