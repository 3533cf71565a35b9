use crate::error::AgentError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "arthakar.toml";

pub const LLM_API_KEY_VAR: &str = "GROQ_API_KEY";
pub const FINANCIAL_DATA_API_KEY_VAR: &str = "FINANCIAL_DATA_API_KEY";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PriceSourceKind {
    #[default]
    Mock,
    AlphaVantage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StockConfig {
    pub source: PriceSourceKind,
    pub mock_price: f64,
    pub base_url: String,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            source: PriceSourceKind::Mock,
            mock_price: 150.75,
            base_url: "https://www.alphavantage.co".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NewsConfig {
    pub base_url: String,
    pub selector: String,
    pub max_headlines: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.google.com/search".to_string(),
            selector: "div.BNeawe.vvjwJb.AP7Wnd".to_string(),
            max_headlines: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentConfig {
    pub summary_chars: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            summary_chars: 1000,
        }
    }
}

/// Secrets pulled from the process environment. Never read from or written
/// to the TOML file.
#[derive(Clone, Default, PartialEq)]
pub struct Credentials {
    pub llm_api_key: String,
    pub financial_data_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_api_key", &"<redacted>")
            .field("financial_data_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Reads both required keys through `lookup`, failing on the first one
    /// that is absent or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AgentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    AgentError::Configuration(format!(
                        "{} not found in environment variables. Please set it in your .env file.",
                        name
                    ))
                })
        };

        Ok(Self {
            llm_api_key: require(LLM_API_KEY_VAR)?,
            financial_data_api_key: require(FINANCIAL_DATA_API_KEY_VAR)?,
        })
    }

    pub fn from_env() -> Result<Self, AgentError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub temperature: f64,
    pub max_iterations: usize,
    pub model_timeout_secs: u64,
    pub tool_timeout_secs: u64,
    pub stock: StockConfig,
    pub news: NewsConfig,
    pub document: DocumentConfig,
    #[serde(skip)]
    pub credentials: Credentials,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: "groq".to_string(),
            model: "llama3-70b-8192".to_string(),
            base_url: None,
            temperature: 0.0,
            max_iterations: 20,
            model_timeout_secs: 120,
            tool_timeout_secs: 30,
            stock: StockConfig::default(),
            news: NewsConfig::default(),
            document: DocumentConfig::default(),
            credentials: Credentials::default(),
        }
    }
}

impl Config {
    /// Builds the process-wide configuration: `.env` overrides, then the TOML
    /// file (explicit path, or `./arthakar.toml` when present), then the
    /// required credentials.
    pub fn load(path: Option<&Path>) -> Result<Self, AgentError> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            return Err(AgentError::Configuration(format!(
                "Failed to load .env file: {}",
                e
            )));
        }

        let mut config = match path {
            Some(path) => load_config_file(path),
            None => {
                let default_path = PathBuf::from(CONFIG_FILE);
                if default_path.exists() {
                    load_config_file(&default_path)
                } else {
                    Ok(Config::default())
                }
            }
        }
        .map_err(|e| AgentError::Configuration(format!("{:#}", e)))?;

        config.credentials = Credentials::from_env()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AgentError> {
        if self.max_iterations == 0 {
            return Err(AgentError::Configuration(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.model_timeout_secs == 0 || self.tool_timeout_secs == 0 {
            return Err(AgentError::Configuration(
                "timeouts must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_config_file(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!("Config file not found at {}", path.display())
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", path.display(), e)
        }
    })?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))
}
