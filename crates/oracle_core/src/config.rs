//! Oracle configuration
//!
//! Provider and engine identifiers are validated when parsed: an
//! unknown name is a configuration error, never a silent substitution.
//! Config file: ~/.config/oracle/config.toml or /etc/oracle/config.toml,
//! with CLI flags taking precedence over both.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Default generation model, matching the Ollama default install
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Default number of result pages fetched per search
pub const DEFAULT_SEARCH_PAGES: u32 = 2;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown LLM provider '{0}' (valid: ollama, lm-studio)")]
    UnknownProvider(String),

    #[error("unknown search engine '{0}' (valid: google, bing, yahoo, duckduckgo, brave)")]
    UnknownEngine(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// LLM backend provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Ollama,
    LmStudio,
}

impl Default for LlmProvider {
    fn default() -> Self {
        Self::Ollama
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "lm-studio" | "lm_studio" | "lmstudio" => Ok(Self::LmStudio),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::LmStudio => write!(f, "lm-studio"),
        }
    }
}

/// Supported web search engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngineId {
    Google,
    Bing,
    Yahoo,
    DuckDuckGo,
    Brave,
}

impl FromStr for SearchEngineId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "bing" => Ok(Self::Bing),
            "yahoo" => Ok(Self::Yahoo),
            "duckduckgo" | "ddg" => Ok(Self::DuckDuckGo),
            "brave" => Ok(Self::Brave),
            other => Err(ConfigError::UnknownEngine(other.to_string())),
        }
    }
}

impl fmt::Display for SearchEngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::Yahoo => "yahoo",
            Self::DuckDuckGo => "duckduckgo",
            Self::Brave => "brave",
        };
        write!(f, "{}", name)
    }
}

/// Session configuration, immutable for the lifetime of one Oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Primary generation model
    #[serde(default = "default_model")]
    pub model: String,

    /// LLM backend provider
    #[serde(default)]
    pub provider: LlmProvider,

    /// Search engine for answer augmentation; None disables the
    /// evaluation/search pipeline entirely
    #[serde(default)]
    pub search_engine: Option<SearchEngineId>,

    /// Result pages fetched per search
    #[serde(default = "default_search_pages")]
    pub search_pages: u32,

    /// Model used for the evaluation/refinement/summarization/synthesis
    /// stages. Defaults to the primary model.
    #[serde(default)]
    pub stage_model: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_search_pages() -> u32 {
    DEFAULT_SEARCH_PAGES
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            provider: LlmProvider::Ollama,
            search_engine: None,
            search_pages: DEFAULT_SEARCH_PAGES,
            stage_model: None,
        }
    }
}

impl OracleConfig {
    /// Model used for pipeline stages (evaluator, refiner, summarizer,
    /// synthesizer)
    pub fn stage_model(&self) -> &str {
        self.stage_model.as_deref().unwrap_or(&self.model)
    }

    /// Get default user config path: ~/.config/oracle/config.toml
    pub fn user_config_path() -> Option<PathBuf> {
        let home = std::env::var("HOME").ok()?;
        Some(Path::new(&home).join(".config").join("oracle").join("config.toml"))
    }

    /// Get system config path: /etc/oracle/config.toml
    pub fn system_config_path() -> PathBuf {
        PathBuf::from("/etc/oracle/config.toml")
    }

    /// Load configuration from file
    ///
    /// Priority:
    /// 1. User config (~/.config/oracle/config.toml)
    /// 2. System config (/etc/oracle/config.toml)
    /// 3. Defaults
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                return Self::load_from(&user_path);
            }
        }

        let system_path = Self::system_config_path();
        if system_path.exists() {
            return Self::load_from(&system_path);
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
