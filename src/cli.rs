//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Every value is optional so that settings
//! from `.snipreview.toml` survive unless overridden.

use crate::config::Provider;
use crate::models::ReviewCategory;
use clap::Parser;
use std::path::PathBuf;

/// snipreview - interactive LLM code snippet reviewer
///
/// Paste a snippet, pick a review type (general, security, performance)
/// and get the model's review back. Rate-limited APIs are handled with
/// a fixed warm-up delay and exponential backoff.
///
/// Examples:
///   snipreview
///   snipreview --provider ollama --model qwen2.5-coder:32b
///   snipreview --language rust --verbose
///   snipreview --review-type security < handler.py
///   snipreview --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// LLM provider to use
    #[arg(long, value_name = "PROVIDER")]
    pub provider: Option<Provider>,

    /// Model to use for reviews
    ///
    /// Defaults to mistral-large-latest (Mistral) or llama3.2:latest (Ollama).
    /// Can also be set via SNIPREVIEW_MODEL env var or .snipreview.toml config.
    #[arg(short, long, env = "SNIPREVIEW_MODEL")]
    pub model: Option<String>,

    /// Provider API base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Mistral API key
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Temperature for LLM responses (0.0 - 1.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Language label shown on the code panel
    #[arg(short, long, value_name = "LANG")]
    pub language: Option<String>,

    /// Review standard input once with this review type and exit
    ///
    /// One of: general, security, performance. Skips the interactive menu.
    #[arg(short = 't', long, value_name = "TYPE")]
    pub review_type: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .snipreview.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only in the log)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .snipreview.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref model) = self.model {
            if model.trim().is_empty() {
                return Err("Model name must not be empty".to_string());
            }
        }

        if let Some(ref review_type) = self.review_type {
            review_type
                .parse::<ReviewCategory>()
                .map_err(|e| e.to_string())?;
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
