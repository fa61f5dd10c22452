// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{ChronologyError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";
pub const MAX_LLM_RETRIES: u32 = 10;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Auto,
    #[value(name = "openai")]
    OpenAi,
    Groq,
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Auto => "auto",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Groq => "groq",
            ProviderKind::Ollama => "ollama",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    /// Overrides the provider's default model when set.
    pub model: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_api_key: Option<String>,
    pub groq_base_url: String,
    pub groq_model: String,
    pub groq_api_key: Option<String>,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub num_ctx: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_review_retries: u32,
    pub parallel_workers: usize,
    pub skip_patterns: Vec<String>,
    pub max_file_size_mb: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub pretty: bool,
}

/// Concrete endpoint settings after `auto` has been decided.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProvider {
    pub kind: ProviderKind,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Auto,
            model: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_key: None,
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            groq_model: "llama-3.3-70b-versatile".to_string(),
            groq_api_key: None,
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "qwen2.5:7b".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
            max_retries: 3,
            num_ctx: 16000,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_review_retries: 2,
            parallel_workers: 2,
            skip_patterns: vec![".git/*".to_string()],
            max_file_size_mb: 50,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./chronology_output"),
            pretty: true,
        }
    }
}

impl LlmConfig {
    pub fn resolve(&self) -> Result<ResolvedProvider> {
        let openai_key = non_empty(self.openai_api_key.clone())
            .or_else(|| non_empty(std::env::var(OPENAI_API_KEY_VAR).ok()));
        let groq_key = non_empty(self.groq_api_key.clone())
            .or_else(|| non_empty(std::env::var(GROQ_API_KEY_VAR).ok()));

        let kind = match self.provider {
            ProviderKind::Auto if openai_key.is_some() => ProviderKind::OpenAi,
            ProviderKind::Auto if groq_key.is_some() => ProviderKind::Groq,
            ProviderKind::Auto => ProviderKind::Ollama,
            explicit => explicit,
        };

        let (base_url, default_model, api_key) = match kind {
            ProviderKind::OpenAi => {
                let key = openai_key.ok_or_else(|| {
                    ChronologyError::Config(format!(
                        "{} is required for the openai provider",
                        OPENAI_API_KEY_VAR
                    ))
                })?;
                (&self.openai_base_url, &self.openai_model, Some(key))
            }
            ProviderKind::Groq => {
                let key = groq_key.ok_or_else(|| {
                    ChronologyError::Config(format!(
                        "{} is required for the groq provider",
                        GROQ_API_KEY_VAR
                    ))
                })?;
                (&self.groq_base_url, &self.groq_model, Some(key))
            }
            _ => (&self.ollama_base_url, &self.ollama_model, None),
        };

        let model = non_empty(self.model.clone()).unwrap_or_else(|| default_model.clone());

        Ok(ResolvedProvider {
            kind,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("CHRONOLOGY")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| ChronologyError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| ChronologyError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            llm: LlmConfig::default(),
            pipeline: PipelineConfig::default(),
            output: OutputConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.parallel_workers == 0 {
            return Err(ChronologyError::Config(
                "parallel_workers must be greater than 0".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ChronologyError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_retries > MAX_LLM_RETRIES {
            return Err(ChronologyError::Config(format!(
                "max_retries must be at most {}, got {}",
                MAX_LLM_RETRIES, self.llm.max_retries
            )));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ChronologyError::Config(format!(
                "temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }

        for url in [
            &self.llm.openai_base_url,
            &self.llm.groq_base_url,
            &self.llm.ollama_base_url,
        ] {
            Validator::validate_url(url).map_err(|e| ChronologyError::Config(e.to_string()))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.max_review_retries, 2);
        assert_eq!(config.llm.num_ctx, 16000);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default_config();
        config.pipeline.parallel_workers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_temperature_rejected() {
        let mut config = Config::default_config();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_retries_bounded() {
        let mut config = Config::default_config();
        config.llm.max_retries = MAX_LLM_RETRIES;
        assert!(config.validate().is_ok());
        config.llm.max_retries = 40;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chronology.toml");
        fs::write(
            &path,
            "[llm]\nprovider = \"ollama\"\nollama_model = \"deepseek-r1:14b\"\n\n[pipeline]\nparallel_workers = 4\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.llm.provider, ProviderKind::Ollama);
        assert_eq!(config.llm.ollama_model, "deepseek-r1:14b");
        assert_eq!(config.pipeline.parallel_workers, 4);
        assert_eq!(config.pipeline.max_review_retries, 2);
    }

    #[test]
    fn test_resolve_explicit_ollama() {
        let mut llm = LlmConfig::default();
        llm.provider = ProviderKind::Ollama;
        llm.ollama_base_url = "http://localhost:11434/".to_string();

        let resolved = llm.resolve().unwrap();
        assert_eq!(resolved.kind, ProviderKind::Ollama);
        assert_eq!(resolved.base_url, "http://localhost:11434");
        assert_eq!(resolved.model, "qwen2.5:7b");
        assert!(resolved.api_key.is_none());
    }

    #[test]
    fn test_resolve_auto_prefers_openai_key() {
        let mut llm = LlmConfig::default();
        llm.openai_api_key = Some("sk-test".to_string());
        llm.groq_api_key = Some("gsk-test".to_string());

        let resolved = llm.resolve().unwrap();
        assert_eq!(resolved.kind, ProviderKind::OpenAi);
        assert_eq!(resolved.model, "gpt-4o-mini");
        assert_eq!(resolved.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_resolve_model_override() {
        let mut llm = LlmConfig::default();
        llm.provider = ProviderKind::Groq;
        llm.groq_api_key = Some("gsk-test".to_string());
        llm.model = Some("openai/gpt-oss-120b".to_string());

        let resolved = llm.resolve().unwrap();
        assert_eq!(resolved.kind, ProviderKind::Groq);
        assert_eq!(resolved.model, "openai/gpt-oss-120b");
    }

    #[test]
    fn test_resolve_auto_without_keys_falls_back_to_ollama() {
        if std::env::var(OPENAI_API_KEY_VAR).is_ok() || std::env::var(GROQ_API_KEY_VAR).is_ok() {
            return;
        }
        let resolved = LlmConfig::default().resolve().unwrap();
        assert_eq!(resolved.kind, ProviderKind::Ollama);
    }
}
