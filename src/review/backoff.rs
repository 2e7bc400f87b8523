//! Backoff scheduling and countdown waits.

use super::ProgressSink;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Granularity of countdown ticks.
const TICK: Duration = Duration::from_secs(1);

/// Wait before retry `attempt` (1-based): `base * 2^(attempt-1)`.
///
/// Saturates instead of overflowing for absurd attempt counts.
pub fn wait_duration(attempt: u32, base: Duration) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.saturating_mul(factor)
}

/// Suspend for `duration`, ticking the countdown once per second.
///
/// The sink receives `tick(remaining_seconds, label)` before each second
/// elapses and a single `clear_progress_line()` once the wait is over.
/// A zero duration returns immediately without ticking or clearing.
/// Dropping the returned future cancels the wait.
pub async fn await_with_progress(duration: Duration, label: &str, sink: &dyn ProgressSink) {
    if duration.is_zero() {
        return;
    }

    debug!("{} for {}s", label, duration.as_secs());

    let mut remaining = duration;
    while !remaining.is_zero() {
        sink.tick(whole_seconds(remaining), label);
        let step = remaining.min(TICK);
        sleep(step).await;
        remaining -= step;
    }

    sink.clear_progress_line();
}

/// Seconds left, rounded up so a partial second still shows as 1.
fn whole_seconds(remaining: Duration) -> u64 {
    remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
}
