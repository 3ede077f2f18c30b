//! Configuration management for the askpdf CLI.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.askpdf/config.yaml)
//!
//! The configuration is workspace-centric, with all persisted state stored
//! in `.askpdf/` under the workspace root.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// CLI behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .askpdf/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Default LLM provider (e.g., "groq", "ollama")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// LLM provider configurations
    pub llm: Option<LlmConfig>,

    /// Embedding settings
    pub embedding: EmbeddingSettings,

    /// Retrieval settings
    pub retrieval: RetrievalSettings,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Groq {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
    },
    Ollama {
        endpoint: String,
        model: String,
        #[serde(rename = "embeddingModel")]
        embedding_model: Option<String>,
        timeout: Option<u64>,
    },
}

/// Embedding settings from config.yaml.
///
/// These are plain data; the rag crate turns them into a concrete
/// embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Embedding provider name ("trigram" or "ollama")
    #[serde(default = "EmbeddingSettings::default_provider")]
    pub provider: String,

    /// Embedding model identifier
    #[serde(default = "EmbeddingSettings::default_model")]
    pub model: String,

    /// Embedding vector dimensionality
    #[serde(default = "EmbeddingSettings::default_dimensions")]
    pub dimensions: usize,

    /// Provider endpoint (for ollama)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl EmbeddingSettings {
    fn default_provider() -> String {
        "trigram".to_string()
    }

    fn default_model() -> String {
        "trigram-v1".to_string()
    }

    fn default_dimensions() -> usize {
        384
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: Self::default_provider(),
            model: Self::default_model(),
            dimensions: Self::default_dimensions(),
            endpoint: None,
        }
    }
}

/// Retrieval settings from config.yaml.
///
/// Controls how many neighbors are fetched and how wide the focus-page
/// window is. The window spans `window_behind` pages before the focus
/// page and `window_ahead` pages starting at it (exclusive end).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Number of nearest neighbors to request
    #[serde(default = "RetrievalSettings::default_top_k")]
    pub top_k: usize,

    /// Pages before the focus page included in the window
    #[serde(default = "RetrievalSettings::default_window_behind")]
    pub window_behind: usize,

    /// Pages from the focus page forward (exclusive end)
    #[serde(default = "RetrievalSettings::default_window_ahead")]
    pub window_ahead: usize,

    /// Search only inside the window instead of the whole document
    #[serde(default)]
    pub window_only: bool,
}

impl RetrievalSettings {
    fn default_top_k() -> usize {
        5
    }

    fn default_window_behind() -> usize {
        10
    }

    fn default_window_ahead() -> usize {
        11
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: Self::default_top_k(),
            window_behind: Self::default_window_behind(),
            window_ahead: Self::default_window_ahead(),
            window_only: false,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    embedding: Option<EmbeddingSettings>,
    retrieval: Option<RetrievalSettings>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
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
            provider: "groq".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            api_key: None,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
            embedding: EmbeddingSettings::default(),
            retrieval: RetrievalSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `ASKPDF_WORKSPACE`: Override workspace path
    /// - `ASKPDF_CONFIG`: Path to config file
    /// - `ASKPDF_PROVIDER`: LLM provider
    /// - `ASKPDF_MODEL`: Model identifier
    /// - `ASKPDF_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use askpdf_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        // Load from environment variables
        if let Ok(workspace) = std::env::var("ASKPDF_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("ASKPDF_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Validate workspace exists
        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.workspace.join(".askpdf/config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("ASKPDF_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("ASKPDF_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("ASKPDF_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        // Check for NO_COLOR environment variable
        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        // Merge workspace settings
        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        // Merge logging settings
        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        // Merge LLM settings
        if let Some(llm) = config_file.llm {
            // Set active provider from YAML
            result.provider = llm.active_provider.clone();

            // Set model from active provider config
            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = match provider_config {
                    ProviderConfig::Groq { model, .. } => model.clone(),
                    ProviderConfig::Ollama { model, .. } => model.clone(),
                };
            }

            result.llm = Some(llm);
        }

        // Merge embedding and retrieval settings
        if let Some(embedding) = config_file.embedding {
            result.embedding = embedding;
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

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

    /// Get the path to the .askpdf directory.
    pub fn askpdf_dir(&self) -> PathBuf {
        self.workspace.join(".askpdf")
    }

    /// Get the path to the bundle storage directory.
    pub fn bundles_dir(&self) -> PathBuf {
        self.askpdf_dir().join("bundles")
    }

    /// Ensure the .askpdf directory exists.
    pub fn ensure_askpdf_dir(&self) -> AppResult<()> {
        let askpdf_dir = self.askpdf_dir();
        if !askpdf_dir.exists() {
            std::fs::create_dir_all(&askpdf_dir).map_err(|e| {
                AppError::Config(format!("Failed to create .askpdf directory: {}", e))
            })?;
        }
        Ok(())
    }

    /// Get the active provider configuration.
    pub fn get_provider_config(&self, provider: &str) -> AppResult<Option<ProviderConfig>> {
        if let Some(ref llm) = self.llm {
            Ok(llm.providers.get(provider).cloned())
        } else {
            Ok(None)
        }
    }

    /// Resolve API key for a provider.
    ///
    /// Precedence: `ASKPDF_API_KEY`, then the env var named in the provider
    /// config, then `GROQ_API_KEY` for the groq provider.
    pub fn resolve_api_key(&self, provider: &str) -> AppResult<Option<String>> {
        // Check explicit ASKPDF_API_KEY first
        if let Some(ref key) = self.api_key {
            return Ok(Some(key.clone()));
        }

        // Try provider-specific config
        if let Some(provider_config) = self.get_provider_config(provider)? {
            if let ProviderConfig::Groq { api_key_env, .. } = provider_config {
                if let Ok(key) = std::env::var(&api_key_env) {
                    return Ok(Some(key));
                }
            }
        }

        // Conventional fallback for groq
        if provider == "groq" {
            if let Ok(key) = std::env::var("GROQ_API_KEY") {
                return Ok(Some(key));
            }
        }

        Ok(None)
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        // Check if provider is known
        let provider = &self.provider;
        let known_providers = ["groq", "ollama"];

        if !known_providers.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                provider,
                known_providers.join(", ")
            )));
        }

        // Validate provider-specific requirements
        if let Some(provider_config) = self.get_provider_config(provider)? {
            match provider_config {
                ProviderConfig::Groq { api_key_env, .. } => {
                    if std::env::var(&api_key_env).is_err() {
                        return Err(AppError::Config(format!(
                            "API key not found in environment variable: {}",
                            api_key_env
                        )));
                    }
                }
                ProviderConfig::Ollama { .. } => {
                    // Ollama doesn't require API keys
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "groq");
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert!(!config.verbose);
        assert!(!config.no_color);
    }

    #[test]
    fn test_default_retrieval_settings() {
        let settings = RetrievalSettings::default();
        assert_eq!(settings.top_k, 5);
        assert_eq!(settings.window_behind, 10);
        assert_eq!(settings.window_ahead, 11);
        assert!(!settings.window_only);
    }

    #[test]
    fn test_default_embedding_settings() {
        let settings = EmbeddingSettings::default();
        assert_eq!(settings.provider, "trigram");
        assert_eq!(settings.dimensions, 384);
    }

    #[test]
    fn test_askpdf_dir() {
        let config = AppConfig::default();
        let askpdf_dir = config.askpdf_dir();
        assert!(askpdf_dir.ends_with(".askpdf"));
        assert!(config.bundles_dir().ends_with(".askpdf/bundles"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            None,
            None,
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ollama() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_config_file() {
        let yaml = r#"
llm:
  activeProvider: groq
  providers:
    groq:
      apiKeyEnv: GROQ_API_KEY
      model: llama-3.1-8b-instant
    ollama:
      endpoint: http://localhost:11434
      model: llama3.2
      embeddingModel: nomic-embed-text
retrieval:
  top_k: 3
  window_only: true
"#;
        let parsed: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let llm = parsed.llm.unwrap();
        assert_eq!(llm.active_provider, "groq");
        assert!(matches!(
            llm.providers.get("groq"),
            Some(ProviderConfig::Groq { .. })
        ));
        assert!(matches!(
            llm.providers.get("ollama"),
            Some(ProviderConfig::Ollama { .. })
        ));

        // Unset retrieval fields keep their defaults
        let retrieval = parsed.retrieval.unwrap();
        assert_eq!(retrieval.top_k, 3);
        assert!(retrieval.window_only);
        assert_eq!(retrieval.window_behind, 10);
        assert_eq!(retrieval.window_ahead, 11);
    }
}
