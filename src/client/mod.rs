//! Provider clients.
//!
//! A [`CodeReviewClient`] turns a [`ReviewRequest`] into a [`ReviewResult`]
//! by planning the review with the model and then executing the plan. The
//! chat transport underneath is a [`ChatBackend`], selected by configuration.

pub mod mistral;
pub mod ollama;

pub use mistral::MistralBackend;
pub use ollama::OllamaBackend;

use crate::config::{ModelConfig, Provider};
use crate::models::{ReviewOutput, ReviewRequest, ReviewResult, RunState};
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Failures from a provider. The display text is what gets classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to {0}")]
    Connect(String),

    #[error("API error {status} {}: {body}", status_reason(.status))]
    Api { status: u16, body: String },

    #[error("Failed to send request: {0}")]
    Request(String),

    #[error("Failed to parse provider response: {0}")]
    Decode(String),

    #[error("Provider returned an empty response")]
    EmptyResponse,
}

fn status_reason(status: &u16) -> &'static str {
    reqwest::StatusCode::from_u16(*status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

impl ClientError {
    /// Map a transport error the way the user needs to hear it.
    pub(crate) fn from_transport(err: reqwest::Error, endpoint: &str, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(timeout_seconds)
        } else if err.is_connect() {
            ClientError::Connect(endpoint.to_string())
        } else {
            ClientError::Request(err.to_string())
        }
    }
}

/// Submits review requests to an LLM provider.
#[async_trait]
pub trait CodeReviewClient: Send + Sync {
    async fn submit(&self, request: &ReviewRequest) -> Result<ReviewResult, ClientError>;
}

/// The assistant's reply to one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// The reply stopped at the token limit.
    pub truncated: bool,
}

/// A single-turn chat transport.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Model name, reported with each result.
    fn model(&self) -> &str;

    /// Send one system + user exchange and return the assistant's reply.
    async fn complete(&self, system: &str, user: &str) -> Result<Completion, ClientError>;
}

/// Plans the review first, then executes the plan.
pub struct PlanRunClient<B> {
    backend: B,
}

impl<B: ChatBackend> PlanRunClient<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    async fn plan(&self, request: &ReviewRequest) -> Result<String, ClientError> {
        info!("Generating review plan...");
        let user = format!(
            "Create a short numbered plan (at most 5 steps) for completing the task below. \
             Output only the plan.\n\nTask:\n{}",
            request.prompt()
        );
        let plan = non_empty(self.backend.complete(PLANNER_SYSTEM_PROMPT, &user).await?)?;
        debug!("Plan:\n{}", plan.text);
        Ok(plan.text)
    }

    async fn execute(&self, request: &ReviewRequest, plan: &str) -> Result<Completion, ClientError> {
        info!("Executing review...");
        let user = format!(
            "Plan:\n{}\n\nCarry out the plan and respond with the final review only.\n\nTask:\n{}",
            plan,
            request.prompt()
        );
        non_empty(self.backend.complete(EXECUTOR_SYSTEM_PROMPT, &user).await?)
    }
}

#[async_trait]
impl<B: ChatBackend> CodeReviewClient for PlanRunClient<B> {
    async fn submit(&self, request: &ReviewRequest) -> Result<ReviewResult, ClientError> {
        let plan = self.plan(request).await?;
        let review = self.execute(request, &plan).await?;

        let state = if review.truncated {
            warn!("Review was cut off at the model's token limit");
            RunState::Truncated
        } else {
            RunState::Complete
        };

        Ok(ReviewResult {
            state,
            plan,
            outputs: vec![ReviewOutput { value: review.text }],
            model_used: self.backend.model().to_string(),
            completed_at: Utc::now(),
        })
    }
}

fn non_empty(completion: Completion) -> Result<Completion, ClientError> {
    let trimmed = completion.text.trim();
    if trimmed.is_empty() {
        Err(ClientError::EmptyResponse)
    } else {
        Ok(Completion {
            text: trimmed.to_string(),
            truncated: completion.truncated,
        })
    }
}

/// Build the configured client.
pub fn build_client(
    config: &ModelConfig,
    api_key: Option<String>,
) -> Result<Box<dyn CodeReviewClient>, ClientError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {}", e)))?;

    info!(
        "Using {} provider with model {}",
        config.provider,
        config.effective_model()
    );

    let client: Box<dyn CodeReviewClient> = match config.provider {
        Provider::Mistral => Box::new(PlanRunClient::new(MistralBackend::new(
            http, config, api_key,
        )?)),
        Provider::Ollama => Box::new(PlanRunClient::new(OllamaBackend::new(http, config))),
    };

    Ok(client)
}

/// POST a prepared request and decode the JSON body.
pub(crate) async fn post_json<R: DeserializeOwned>(
    builder: reqwest::RequestBuilder,
    endpoint: &str,
    timeout_seconds: u64,
) -> Result<R, ClientError> {
    let response = builder
        .send()
        .await
        .map_err(|e| ClientError::from_transport(e, endpoint, timeout_seconds))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<R>()
        .await
        .map_err(|e| ClientError::Decode(e.to_string()))
}

const PLANNER_SYSTEM_PROMPT: &str = "You are a planning assistant for a code review agent. \
Break the requested review into a few concrete steps. Do not perform the review yet.";

const EXECUTOR_SYSTEM_PROMPT: &str = "You are an expert code reviewer. \
Follow the given plan and produce one clear, comprehensive review in Markdown.";
