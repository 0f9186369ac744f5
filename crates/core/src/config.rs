//! Configuration management for docent.
//!
//! Configuration is layered from several sources, lowest precedence first:
//! - Built-in defaults
//! - The config file (`.docent/config.yaml` or an explicit path)
//! - Environment variables
//! - Command-line flags
//!
//! The resulting [`AppConfig`] is fixed for the lifetime of the process.
//! All persisted state lives under the workspace's `.docent/` directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::{Host, Url};

use crate::error::{AppError, AppResult};

/// Name of the state directory inside the workspace.
pub const DOCENT_DIR: &str = ".docent";

/// Embedding providers understood by the knowledge crate.
pub const EMBEDDING_PROVIDERS: [&str; 2] = ["hashed", "ollama"];

/// Language model providers understood by the llm crate.
pub const LLM_PROVIDERS: [&str; 2] = ["ollama", "llama-cpp"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .docent/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Source directory override for documents
    pub documents_path: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Retrieval and generation tunables
    pub rag: RagSettings,

    /// Embedding model settings
    pub embedding: EmbeddingSettings,

    /// Language model settings
    pub llm: LlmSettings,
}

/// Chunking, retrieval and generation tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RagSettings {
    /// Window size in characters
    pub chunk_size: usize,

    /// Characters shared by consecutive windows
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per query
    pub top_k: usize,

    /// Upper bound on generated tokens per answer
    pub max_tokens: u32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 600,
            chunk_overlap: 100,
            top_k: 4,
            max_tokens: 300,
        }
    }
}

/// Embedding model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmbeddingSettings {
    /// Provider name: "hashed" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Endpoint of the local model runtime (ollama only)
    pub endpoint: String,

    /// Number of texts sent to the provider per call
    pub batch_size: usize,

    /// Vector width for providers that let us choose it (hashed only)
    pub dimensions: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "hashed".to_string(),
            model: "hashed-ngram-v1".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            batch_size: 64,
            dimensions: 384,
            timeout_secs: 60,
        }
    }
}

/// Language model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmSettings {
    /// Provider name: "ollama" or "llama-cpp"
    pub provider: String,

    /// Model identifier or model file served by the runtime
    pub model: String,

    /// Endpoint of the local model runtime
    pub endpoint: String,

    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "orca-mini:3b".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            temperature: None,
            timeout_secs: 300,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    rag: Option<RagSettings>,
    embedding: Option<EmbeddingSettings>,
    llm: Option<LlmSettings>,
    documents: Option<DocumentsConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentsConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            documents_path: None,
            log_level: None,
            verbose: false,
            no_color: false,
            rag: RagSettings::default(),
            embedding: EmbeddingSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration for a workspace.
    ///
    /// `workspace` defaults to the current directory. `config_file` defaults
    /// to `.docent/config.yaml`, which is optional; an explicitly named file
    /// must exist.
    ///
    /// Environment variables applied after the file:
    /// - `DOCENT_LLM_MODEL`: Language model identifier
    /// - `DOCENT_EMBEDDING_MODEL`: Embedding model identifier
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use docent_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let config = Self::load_file(workspace, config_file)?.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load defaults plus the config file, without consulting the environment.
    pub fn load_file(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file not found: {:?}",
                        path
                    )));
                }
                config.config_file = Some(path.clone());
                path
            }
            None => config.docent_dir().join("config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self;

        if let Some(rag) = config_file.rag {
            result.rag = rag;
        }
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }
        if let Some(llm) = config_file.llm {
            result.llm = llm;
        }

        if let Some(path) = config_file.documents.and_then(|d| d.path) {
            let path = PathBuf::from(path);
            result.documents_path = Some(if path.is_absolute() {
                path
            } else {
                result.workspace.join(path)
            });
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    fn apply_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("DOCENT_LLM_MODEL") {
            self.llm.model = model;
        }

        if let Ok(model) = std::env::var("DOCENT_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }

        self
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the environment and the
    /// config file.
    pub fn with_overrides(
        mut self,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate tunables and provider settings.
    pub fn validate(&self) -> AppResult<()> {
        let rag = &self.rag;

        if rag.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be greater than 0".to_string()));
        }

        if rag.chunk_overlap >= rag.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                rag.chunk_overlap, rag.chunk_size
            )));
        }

        if rag.top_k == 0 {
            return Err(AppError::Config("topK must be greater than 0".to_string()));
        }

        if rag.max_tokens == 0 {
            return Err(AppError::Config("maxTokens must be greater than 0".to_string()));
        }

        if self.embedding.batch_size == 0 {
            return Err(AppError::Config("embedding batchSize must be greater than 0".to_string()));
        }

        if !EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.provider == "hashed" && self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "embedding dimensions must be greater than 0".to_string(),
            ));
        }

        if !LLM_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                self.llm.provider,
                LLM_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.provider != "hashed" {
            ensure_loopback(&self.embedding.endpoint)?;
        }
        ensure_loopback(&self.llm.endpoint)?;

        Ok(())
    }

    /// Get the path to the .docent directory.
    pub fn docent_dir(&self) -> PathBuf {
        self.workspace.join(DOCENT_DIR)
    }

    /// Directory scanned for source documents.
    pub fn documents_dir(&self) -> PathBuf {
        self.documents_path
            .clone()
            .unwrap_or_else(|| self.docent_dir().join("documents"))
    }

    /// Directory holding the paired index and chunk files.
    pub fn index_dir(&self) -> PathBuf {
        self.docent_dir().join("index")
    }

    /// Directory holding prompt overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.docent_dir().join("prompts")
    }

    /// Ensure the .docent directory exists.
    pub fn ensure_docent_dir(&self) -> AppResult<()> {
        let dir = self.docent_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Config(format!("Failed to create .docent directory: {}", e))
            })?;
        }
        Ok(())
    }
}

/// Reject endpoints that would leave the machine.
///
/// The endpoint must be an absolute `http` or `https` URL whose host is
/// `localhost`, an address in `127.0.0.0/8` or `::1`.
pub fn ensure_loopback(endpoint: &str) -> AppResult<()> {
    let url = Url::parse(endpoint).map_err(|e| {
        AppError::Config(format!("Endpoint '{}' is not a valid URL: {}", endpoint, e))
    })?;

    let is_http = matches!(url.scheme(), "http" | "https");
    let is_loopback = match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    };

    if is_http && is_loopback {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "Endpoint '{}' is not a loopback address; docent only talks to local model runtimes",
            endpoint
        )))
    }
}
