//! The retry loop around a single review submission.
//!
//! Every run waits a fixed initial delay, submits, and on a rate-limit
//! failure backs off exponentially (60s, 120s, 240s) before resubmitting.
//! Any other failure aborts immediately. Exhausting the retries is its own
//! outcome so callers can tell the user to come back later.

use super::backoff::{await_with_progress, wait_duration};
use super::classifier::{classify, ErrorKind};
use super::{ProgressSink, ReviewEvent};
use crate::client::CodeReviewClient;
use crate::models::{ReviewOutcome, ReviewRequest};
use std::time::Duration;
use tracing::{error, info, warn};

/// Rate-limit protection delay before the first submission of every review.
pub const INITIAL_DELAY: Duration = Duration::from_secs(60);

/// Rate-limit retries allowed after the first submission.
pub const MAX_RETRIES: u32 = 3;

/// Wait before the first retry; doubled for each further retry.
pub const BASE_WAIT: Duration = Duration::from_secs(60);

/// Label shown next to every countdown.
pub const WAIT_LABEL: &str = "Waiting";

/// Per-run retry bookkeeping. Never outlives a single `run`.
#[derive(Debug)]
struct RetryState {
    attempt: u32,
    max_retries: u32,
    base_wait: Duration,
}

impl RetryState {
    fn new(max_retries: u32, base_wait: Duration) -> Self {
        Self {
            attempt: 0,
            max_retries,
            base_wait,
        }
    }

    /// Count a rate-limited submission.
    ///
    /// Returns the wait before the next retry, or `None` once the retry
    /// budget is spent. `attempt` never exceeds `max_retries`.
    fn next_wait(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_retries {
            return None;
        }
        self.attempt += 1;
        Some(wait_duration(self.attempt, self.base_wait))
    }
}

/// Drives one review request to a terminal [`ReviewOutcome`].
#[derive(Debug, Clone)]
pub struct ReviewOrchestrator {
    initial_delay: Duration,
    max_retries: u32,
    base_wait: Duration,
}

impl Default for ReviewOrchestrator {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_DELAY,
            max_retries: MAX_RETRIES,
            base_wait: BASE_WAIT,
        }
    }
}

impl ReviewOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the request against `client` until it succeeds, fails for good,
    /// or runs out of rate-limit retries.
    ///
    /// Submissions are strictly sequential. Dropping the returned future
    /// cancels whatever wait or submission is in flight.
    pub async fn run<C>(
        &self,
        request: &ReviewRequest,
        client: &C,
        progress: &dyn ProgressSink,
    ) -> ReviewOutcome
    where
        C: CodeReviewClient + ?Sized,
    {
        let mut state = RetryState::new(self.max_retries, self.base_wait);
        let mut submission = 0u32;

        info!("Starting {} review", request.category().as_str());

        progress.notify(&ReviewEvent::InitialDelay {
            wait: self.initial_delay,
        });
        await_with_progress(self.initial_delay, WAIT_LABEL, progress).await;

        loop {
            submission += 1;
            progress.notify(&ReviewEvent::Submitting { submission });

            let err = match client.submit(request).await {
                Ok(payload) => {
                    info!("Review completed after {} submission(s)", submission);
                    return ReviewOutcome::Success { payload };
                }
                Err(err) => err,
            };

            let message = err.to_string();
            error!("Error occurred: {}", message);

            if classify(&message) == ErrorKind::Other {
                return ReviewOutcome::Failed { message };
            }

            let Some(wait) = state.next_wait() else {
                warn!("Rate limit persisted after {} retries", state.max_retries);
                return ReviewOutcome::RateLimited {
                    attempts_used: state.attempt,
                };
            };

            warn!(
                "Rate limit reached. Attempt {} of {}, backing off {}s",
                state.attempt,
                state.max_retries,
                wait.as_secs()
            );
            progress.notify(&ReviewEvent::RateLimited {
                attempt: state.attempt,
                max_retries: state.max_retries,
                wait,
            });
            await_with_progress(wait, WAIT_LABEL, progress).await;
        }
    }
}
