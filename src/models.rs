//! Data models for the snippet reviewer.
//!
//! This module contains the core data structures passed between the
//! request builder, the orchestrator, the provider clients and the UI.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building a review request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    /// The category text is not one of general/security/performance.
    #[error("invalid review category '{0}' (expected general, security or performance)")]
    InvalidCategory(String),
}

/// Review category, selecting which prompt template is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewCategory {
    /// Code quality, bugs and best practices
    General,
    /// Vulnerabilities and input validation
    Security,
    /// Complexity and optimization
    Performance,
}

impl ReviewCategory {
    /// All categories in menu order.
    pub const ALL: [ReviewCategory; 3] = [
        ReviewCategory::General,
        ReviewCategory::Security,
        ReviewCategory::Performance,
    ];

    /// Lowercase identifier used in logs and accepted by `FromStr`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewCategory::General => "general",
            ReviewCategory::Security => "security",
            ReviewCategory::Performance => "performance",
        }
    }
}

impl FromStr for ReviewCategory {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general" => Ok(ReviewCategory::General),
            "security" => Ok(ReviewCategory::Security),
            "performance" => Ok(ReviewCategory::Performance),
            _ => Err(ReviewError::InvalidCategory(s.to_string())),
        }
    }
}

/// A review request ready for submission.
///
/// Immutable once built; see [`crate::review::prompt::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRequest {
    snippet: String,
    category: ReviewCategory,
    prompt: String,
}

impl ReviewRequest {
    pub(crate) fn new(snippet: String, category: ReviewCategory, prompt: String) -> Self {
        Self {
            snippet,
            category,
            prompt,
        }
    }

    /// The code exactly as the user entered it.
    pub fn snippet(&self) -> &str {
        &self.snippet
    }

    pub fn category(&self) -> ReviewCategory {
        self.category
    }

    /// The full prompt text sent to the provider.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Final state of a plan run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// The model finished its answer.
    Complete,
    /// The model hit its output token limit mid-answer.
    Truncated,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Complete => write!(f, "COMPLETE"),
            RunState::Truncated => write!(f, "TRUNCATED"),
        }
    }
}

/// A single output produced by the executed plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutput {
    /// Raw text of the output. May itself be a JSON document.
    pub value: String,
}

/// What the provider returned for a successful submission.
#[derive(Debug, Clone)]
pub struct ReviewResult {
    /// Final state of the run.
    pub state: RunState,
    /// The review plan the model produced before executing.
    pub plan: String,
    /// Outputs of the executed plan.
    pub outputs: Vec<ReviewOutput>,
    /// Model that produced the review.
    pub model_used: String,
    /// When the run finished.
    pub completed_at: DateTime<Utc>,
}

/// Terminal result of one full review request, including its retries.
#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    /// The provider returned a review.
    Success { payload: ReviewResult },
    /// Every retry hit a rate limit.
    RateLimited { attempts_used: u32 },
    /// A non-retryable error, surfaced verbatim.
    Failed { message: String },
}

impl ReviewOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReviewOutcome::Success { .. })
    }
}
