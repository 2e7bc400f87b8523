//! Review orchestration core.
//!
//! Request building, failure classification, backoff waits and the retry
//! loop that drives a single review to a terminal outcome.

pub mod backoff;
pub mod classifier;
pub mod orchestrator;
pub mod prompt;

pub use orchestrator::ReviewOrchestrator;

use std::time::Duration;

/// Milestones the orchestrator reports while a review is in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEvent {
    /// The fixed rate-limit protection delay is about to start.
    InitialDelay { wait: Duration },
    /// Submission number `submission` (1-based) is being sent.
    Submitting { submission: u32 },
    /// A rate limit was hit; waiting `wait` before retry `attempt`.
    RateLimited {
        attempt: u32,
        max_retries: u32,
        wait: Duration,
    },
}

/// Receives countdown ticks and progress events.
///
/// Implemented by the terminal UI; the orchestrator and the backoff
/// scheduler only ever talk to this trait.
pub trait ProgressSink: Send + Sync {
    /// Redraw the countdown line with `remaining_secs` left.
    fn tick(&self, remaining_secs: u64, label: &str);

    /// Erase the countdown line.
    fn clear_progress_line(&self);

    fn notify(&self, _event: &ReviewEvent) {}
}
