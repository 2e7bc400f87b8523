//! Mistral chat completions backend.

use super::{post_json, ChatBackend, ClientError, Completion};
use crate::config::ModelConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completions response body.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct MistralBackend {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout_seconds: u64,
}

impl MistralBackend {
    /// Create the backend. Fails when no API key was supplied.
    pub fn new(
        http: reqwest::Client,
        config: &ModelConfig,
        api_key: Option<String>,
    ) -> Result<Self, ClientError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ClientError::Config(
                    "MISTRAL_API_KEY is not set (use --api-key or a .env file)".to_string(),
                )
            })?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}/v1/chat/completions",
                config.effective_api_url().trim_end_matches('/')
            ),
            api_key,
            model: config.effective_model(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_seconds: config.timeout_seconds,
        })
    }
}

#[async_trait]
impl ChatBackend for MistralBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, user: &str) -> Result<Completion, ClientError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("POST {} ({} prompt bytes)", self.endpoint, user.len());

        let builder = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);

        let response: CompletionResponse =
            post_json(builder, &self.endpoint, self.timeout_seconds).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(ClientError::EmptyResponse)?;
        let truncated = choice.finish_reason.as_deref() == Some("length");

        choice
            .message
            .content
            .map(|text| Completion { text, truncated })
            .ok_or(ClientError::EmptyResponse)
    }
}
