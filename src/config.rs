//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.snipreview.toml` files. The retry policy is deliberately absent:
//! delays and retry counts are fixed in [`crate::review::orchestrator`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".snipreview.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Display settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// LLM provider behind the review client.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Mistral AI hosted API (needs MISTRAL_API_KEY)
    #[default]
    Mistral,
    /// Local Ollama server
    Ollama,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Mistral => "mistral-large-latest",
            Provider::Ollama => "llama3.2:latest",
        }
    }

    pub fn default_api_url(&self) -> &'static str {
        match self {
            Provider::Mistral => "https://api.mistral.ai",
            Provider::Ollama => "http://localhost:11434",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Mistral => write!(f, "mistral"),
            Provider::Ollama => write!(f, "ollama"),
        }
    }
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Which provider to talk to.
    #[serde(default)]
    pub provider: Provider,

    /// Model name. Falls back to the provider's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// API base URL. Falls back to the provider's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::for_provider(Provider::default())
    }
}

impl ModelConfig {
    /// Defaults for a given provider.
    pub fn for_provider(provider: Provider) -> Self {
        Self {
            provider,
            name: Some(provider.default_model().to_string()),
            api_url: None,
            temperature: default_temperature(),
            max_tokens: None,
            timeout_seconds: default_timeout(),
        }
    }

    /// The configured model name, or the provider default.
    pub fn effective_model(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.provider.default_model().to_string())
    }

    /// The configured API URL, or the provider default.
    pub fn effective_api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| self.provider.default_api_url().to_string())
    }
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout() -> u64 {
    300
}

/// Display settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Language label shown on the code panel.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "python".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.snipreview.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually supplied.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(provider) = args.provider {
            // Switching provider without naming a model picks that provider's default
            if provider != self.model.provider && args.model.is_none() {
                self.model.name = None;
                self.model.api_url = None;
            }
            self.model.provider = provider;
        }

        if let Some(ref model) = args.model {
            self.model.name = Some(model.clone());
        }
        if let Some(ref url) = args.api_url {
            self.model.api_url = Some(url.clone());
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(ref language) = args.language {
            self.display.language = language.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
