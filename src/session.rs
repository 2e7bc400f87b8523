//! The interactive review session.
//!
//! One review at a time: menu, snippet, orchestrated review, outcome, then
//! a fixed cooldown before the next menu. The session ends on Exit, on
//! retry exhaustion (to stop hammering a rate-limited provider) or on an
//! interrupt.

use crate::client::CodeReviewClient;
use crate::models::{ReviewCategory, ReviewOutcome, ReviewRequest};
use crate::review::backoff::await_with_progress;
use crate::review::orchestrator::WAIT_LABEL;
use crate::review::{prompt, ReviewOrchestrator};
use crate::ui::{MessageKind, UserInterface};
use anyhow::{bail, Result};
use std::time::Duration;
use tracing::{info, warn};

/// Pause after each completed review before the menu is shown again.
pub const COOLDOWN: Duration = Duration::from_secs(60);

/// A parsed menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Review(ReviewCategory),
    Exit,
}

impl MenuChoice {
    /// Parse the text typed at the menu prompt (`1`-`4`).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Review(ReviewCategory::General)),
            "2" => Some(MenuChoice::Review(ReviewCategory::Security)),
            "3" => Some(MenuChoice::Review(ReviewCategory::Performance)),
            "4" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user chose Exit or closed input at the menu.
    UserExit,
    /// A one-shot review succeeded.
    Completed,
    /// A one-shot review failed with a non-retryable error.
    ReviewFailed,
    /// A review ran out of rate-limit retries.
    RetriesExhausted,
    /// Ctrl+C during a review or cooldown.
    Interrupted,
}

pub struct SessionLoop<'a> {
    client: &'a dyn CodeReviewClient,
    orchestrator: ReviewOrchestrator,
    cooldown: Duration,
}

impl<'a> SessionLoop<'a> {
    pub fn new(client: &'a dyn CodeReviewClient) -> Self {
        Self {
            client,
            orchestrator: ReviewOrchestrator::new(),
            cooldown: COOLDOWN,
        }
    }

    /// Run reviews until the session ends.
    pub async fn run<U: UserInterface>(&self, ui: &mut U) -> Result<SessionEnd> {
        ui.show_welcome();

        loop {
            let Some(line) = ui.prompt_menu().await? else {
                info!("Input closed at menu, ending session");
                return Ok(SessionEnd::UserExit);
            };

            let category = match MenuChoice::parse(&line) {
                Some(MenuChoice::Exit) => return Ok(SessionEnd::UserExit),
                Some(MenuChoice::Review(category)) => category,
                None => {
                    ui.message(MessageKind::Error, "Invalid choice. Please try again.");
                    continue;
                }
            };

            let snippet = ui.collect_multiline_input().await?;
            if snippet.trim().is_empty() {
                ui.message(MessageKind::Error, "No code provided. Please try again.");
                continue;
            }

            let request = prompt::build(&snippet, category);
            let Some(outcome) = self.review(&*ui, &request).await else {
                return Ok(SessionEnd::Interrupted);
            };

            if let ReviewOutcome::RateLimited { attempts_used } = outcome {
                warn!("Ending session after {} rate-limited retries", attempts_used);
                return Ok(SessionEnd::RetriesExhausted);
            }

            ui.message(
                MessageKind::Notice,
                &format!(
                    "\nWaiting {} seconds before next request...",
                    self.cooldown.as_secs()
                ),
            );
            tokio::select! {
                _ = await_with_progress(self.cooldown, WAIT_LABEL, &*ui) => {}
                _ = ui.interrupted() => {
                    ui.clear_progress_line();
                    return Ok(SessionEnd::Interrupted);
                }
            }
        }
    }

    /// Review a single snippet read from input, without the menu.
    pub async fn run_once<U: UserInterface>(
        &self,
        ui: &mut U,
        category: ReviewCategory,
    ) -> Result<SessionEnd> {
        let snippet = ui.collect_multiline_input().await?;
        if snippet.trim().is_empty() {
            bail!("No code provided on standard input");
        }

        let request = prompt::build(&snippet, category);

        let Some(outcome) = self.review(&*ui, &request).await else {
            return Ok(SessionEnd::Interrupted);
        };

        Ok(match outcome {
            ReviewOutcome::Success { .. } => SessionEnd::Completed,
            ReviewOutcome::Failed { .. } => SessionEnd::ReviewFailed,
            ReviewOutcome::RateLimited { .. } => SessionEnd::RetriesExhausted,
        })
    }

    /// Show the code, run the orchestrator and render its outcome.
    ///
    /// Returns `None` if the user interrupted before an outcome was reached.
    async fn review<U: UserInterface>(
        &self,
        ui: &U,
        request: &ReviewRequest,
    ) -> Option<ReviewOutcome> {
        ui.render_code_block(request.snippet());

        let outcome = tokio::select! {
            outcome = self.orchestrator.run(request, self.client, ui) => outcome,
            _ = ui.interrupted() => {
                ui.clear_progress_line();
                ui.message(MessageKind::Error, "\nReview interrupted.");
                return None;
            }
        };

        if outcome.is_success() {
            info!("Review finished successfully");
        }
        ui.render_outcome(&outcome);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::review::ReviewEvent;
    use crate::testing::{ScriptedClient, ScriptedUi};
    use tokio::time::Instant;

    fn rate_limited() -> ClientError {
        ClientError::Request("429 Too Many Requests".to_string())
    }

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(
            MenuChoice::parse("1"),
            Some(MenuChoice::Review(ReviewCategory::General))
        );
        assert_eq!(
            MenuChoice::parse(" 2\n"),
            Some(MenuChoice::Review(ReviewCategory::Security))
        );
        assert_eq!(
            MenuChoice::parse("3"),
            Some(MenuChoice::Review(ReviewCategory::Performance))
        );
        assert_eq!(MenuChoice::parse("4"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("5"), None);
        assert_eq!(MenuChoice::parse("general"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exit_immediately() {
        let client = ScriptedClient::succeeding();
        let mut ui = ScriptedUi::new(&["4"], &[]);

        let end = SessionLoop::new(&client).run(&mut ui).await.unwrap();

        assert_eq!(end, SessionEnd::UserExit);
        assert_eq!(client.submissions(), 0);
        assert!(ui.welcomed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_input_ends_session() {
        let client = ScriptedClient::succeeding();
        let mut ui = ScriptedUi::new(&[], &[]);

        let end = SessionLoop::new(&client).run(&mut ui).await.unwrap();

        assert_eq!(end, SessionEnd::UserExit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_choice_and_blank_code_reprompt() {
        let client = ScriptedClient::succeeding();
        let mut ui = ScriptedUi::new(&["9", "1", "4"], &["   \n  "]);

        let end = SessionLoop::new(&client).run(&mut ui).await.unwrap();

        assert_eq!(end, SessionEnd::UserExit);
        assert_eq!(client.submissions(), 0);
        assert_eq!(
            ui.messages(),
            vec![
                "Invalid choice. Please try again.".to_string(),
                "No code provided. Please try again.".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_review_then_cooldown_then_exit() {
        let client = ScriptedClient::succeeding();
        let mut ui = ScriptedUi::new(&["2", "4"], &["eval(input())"]);
        let start = Instant::now();

        let end = SessionLoop::new(&client).run(&mut ui).await.unwrap();

        assert_eq!(end, SessionEnd::UserExit);
        assert_eq!(client.submissions(), 1);
        assert_eq!(ui.code_blocks(), vec!["eval(input())".to_string()]);
        assert_eq!(ui.outcomes(), vec!["success".to_string()]);
        assert!(client
            .last_prompt()
            .unwrap()
            .contains("Security vulnerabilities"));
        // initial delay + cooldown
        assert_eq!(start.elapsed(), Duration::from_secs(120));
        assert!(ui
            .messages()
            .contains(&"\nWaiting 60 seconds before next request...".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_review_keeps_session_open() {
        let client = ScriptedClient::always_failing(ClientError::Api {
            status: 401,
            body: "Unauthorized".to_string(),
        });
        let mut ui = ScriptedUi::new(&["3", "1", "4"], &["a = 1", "b = 2"]);

        let end = SessionLoop::new(&client).run(&mut ui).await.unwrap();

        assert_eq!(end, SessionEnd::UserExit);
        assert_eq!(client.submissions(), 2);
        assert_eq!(ui.outcomes(), vec!["failed".to_string(), "failed".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhaustion_ends_session() {
        let client = ScriptedClient::always_failing(rate_limited());
        let mut ui = ScriptedUi::new(&["1", "1", "4"], &["x = 1", "y = 2"]);
        let start = Instant::now();

        let end = SessionLoop::new(&client).run(&mut ui).await.unwrap();

        assert_eq!(end, SessionEnd::RetriesExhausted);
        assert_eq!(client.submissions(), 4);
        assert_eq!(ui.outcomes(), vec!["rate_limited".to_string()]);
        // no cooldown after exhaustion
        assert_eq!(start.elapsed(), Duration::from_secs(480));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_during_initial_delay() {
        let client = ScriptedClient::succeeding();
        let mut ui =
            ScriptedUi::new(&["1", "4"], &["x = 1"]).interrupt_after(Duration::from_secs(10));

        let end = SessionLoop::new(&client).run(&mut ui).await.unwrap();

        assert_eq!(end, SessionEnd::Interrupted);
        assert_eq!(client.submissions(), 0);
        assert!(ui.outcomes().is_empty());
        assert_eq!(ui.progress().clear_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_during_backoff() {
        let client = ScriptedClient::failing_then_succeeding(vec![rate_limited()]);
        let mut ui =
            ScriptedUi::new(&["1", "4"], &["x = 1"]).interrupt_after(Duration::from_secs(90));
        let start = Instant::now();

        let end = SessionLoop::new(&client).run(&mut ui).await.unwrap();

        assert_eq!(end, SessionEnd::Interrupted);
        assert_eq!(start.elapsed(), Duration::from_secs(90));
        // only the first submission; the retry never went out
        assert_eq!(client.submissions(), 1);
        assert!(ui.outcomes().is_empty());
        assert!(ui.messages().contains(&"\nReview interrupted.".to_string()));
        assert!(matches!(
            ui.progress().events().last(),
            Some(ReviewEvent::RateLimited { attempt: 1, .. })
        ));
        // initial delay, then the interrupted backoff
        assert_eq!(ui.progress().clear_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_during_cooldown() {
        let client = ScriptedClient::succeeding();
        let mut ui = ScriptedUi::new(&["1", "1", "4"], &["x = 1", "y = 2"])
            .interrupt_after(Duration::from_secs(90));
        let start = Instant::now();

        let end = SessionLoop::new(&client).run(&mut ui).await.unwrap();

        assert_eq!(end, SessionEnd::Interrupted);
        assert_eq!(start.elapsed(), Duration::from_secs(90));
        assert_eq!(client.submissions(), 1);
        assert_eq!(ui.outcomes(), vec!["success".to_string()]);
        assert_eq!(ui.code_blocks(), vec!["x = 1".to_string()]);
        assert_eq!(ui.progress().clear_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_once_success() {
        let client = ScriptedClient::succeeding();
        let mut ui = ScriptedUi::new(&[], &["for i in range(10): pass"]);

        let end = SessionLoop::new(&client)
            .run_once(&mut ui, ReviewCategory::Performance)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Completed);
        assert!(!ui.welcomed());
        assert!(client
            .last_prompt()
            .unwrap()
            .contains("Performance bottlenecks"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_once_failure_and_blank_input() {
        let client = ScriptedClient::always_failing(ClientError::Timeout(300));
        let mut ui = ScriptedUi::new(&[], &["x = 1", ""]);
        let session = SessionLoop::new(&client);

        assert_eq!(
            session.run_once(&mut ui, ReviewCategory::General).await.unwrap(),
            SessionEnd::ReviewFailed
        );
        assert!(session.run_once(&mut ui, ReviewCategory::General).await.is_err());
        assert_eq!(client.submissions(), 1);
    }
}
