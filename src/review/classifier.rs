//! Failure classification.
//!
//! Decides whether a provider failure message signals a rate limit
//! (retryable with backoff) or anything else (surfaced immediately).

/// Substrings that mark a failure as a rate-limit condition.
///
/// Matched case-insensitively against the whole message.
pub const RATE_LIMIT_INDICATORS: [&str; 4] = [
    "rate limit",
    "429",
    "too many requests",
    "requests rate limit exceeded",
];

/// Classification of a failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transient, provider-signaled; retried with backoff.
    RateLimit,
    /// Anything else; not retried.
    Other,
}

/// Classify a failure message.
pub fn classify(message: &str) -> ErrorKind {
    let lowered = message.to_lowercase();

    if RATE_LIMIT_INDICATORS
        .iter()
        .any(|indicator| lowered.contains(indicator))
    {
        ErrorKind::RateLimit
    } else {
        ErrorKind::Other
    }
}
