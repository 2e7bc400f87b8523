//! Scripted fakes shared by the unit tests.

use crate::client::{ClientError, CodeReviewClient};
use crate::models::{ReviewOutcome, ReviewOutput, ReviewRequest, ReviewResult, RunState};
use crate::review::{ProgressSink, ReviewEvent};
use crate::ui::{MessageKind, UserInterface};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub fn sample_result() -> ReviewResult {
    ReviewResult {
        state: RunState::Complete,
        plan: "1. Read the code\n2. Report findings".to_string(),
        outputs: vec![ReviewOutput {
            value: "No major issues.".to_string(),
        }],
        model_used: "scripted".to_string(),
        completed_at: Utc::now(),
    }
}

/// Fails with queued errors, then with `persistent` (if set) or succeeds.
pub struct ScriptedClient {
    failures: Mutex<VecDeque<ClientError>>,
    persistent: Option<ClientError>,
    submitted: Mutex<Vec<(Instant, String)>>,
}

impl ScriptedClient {
    fn with(failures: Vec<ClientError>, persistent: Option<ClientError>) -> Self {
        Self {
            failures: Mutex::new(failures.into()),
            persistent,
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::with(Vec::new(), None)
    }

    pub fn always_failing(err: ClientError) -> Self {
        Self::with(Vec::new(), Some(err))
    }

    pub fn failing_then_succeeding(failures: Vec<ClientError>) -> Self {
        Self::with(failures, None)
    }

    pub fn submissions(&self) -> u32 {
        self.submitted.lock().unwrap().len() as u32
    }

    /// Whole seconds from `start` to each submission.
    pub fn submitted_at(&self, start: Instant) -> Vec<u64> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|(at, _)| at.duration_since(start).as_secs())
            .collect()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.submitted
            .lock()
            .unwrap()
            .last()
            .map(|(_, prompt)| prompt.clone())
    }
}

#[async_trait]
impl CodeReviewClient for ScriptedClient {
    async fn submit(&self, request: &ReviewRequest) -> Result<ReviewResult, ClientError> {
        self.submitted
            .lock()
            .unwrap()
            .push((Instant::now(), request.prompt().to_string()));

        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        match &self.persistent {
            Some(err) => Err(err.clone()),
            None => Ok(sample_result()),
        }
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    ticks: Mutex<u64>,
    clears: Mutex<u64>,
    events: Mutex<Vec<ReviewEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ReviewEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn tick_count(&self) -> u64 {
        *self.ticks.lock().unwrap()
    }

    pub fn clear_count(&self) -> u64 {
        *self.clears.lock().unwrap()
    }
}

impl ProgressSink for RecordingProgress {
    fn tick(&self, _remaining_secs: u64, _label: &str) {
        *self.ticks.lock().unwrap() += 1;
    }

    fn clear_progress_line(&self) {
        *self.clears.lock().unwrap() += 1;
    }

    fn notify(&self, event: &ReviewEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Feeds queued menu choices and snippets, records everything shown.
pub struct ScriptedUi {
    menu: VecDeque<String>,
    snippets: VecDeque<String>,
    interrupt_at: Option<Instant>,
    progress: RecordingProgress,
    welcomed: Mutex<bool>,
    messages: Mutex<Vec<String>>,
    code_blocks: Mutex<Vec<String>>,
    outcomes: Mutex<Vec<String>>,
}

impl ScriptedUi {
    pub fn new(menu: &[&str], snippets: &[&str]) -> Self {
        Self {
            menu: menu.iter().map(|s| s.to_string()).collect(),
            snippets: snippets.iter().map(|s| s.to_string()).collect(),
            interrupt_at: None,
            progress: RecordingProgress::default(),
            welcomed: Mutex::new(false),
            messages: Mutex::new(Vec::new()),
            code_blocks: Mutex::new(Vec::new()),
            outcomes: Mutex::new(Vec::new()),
        }
    }

    /// Fire an interrupt once `delay` has passed since the UI was created.
    pub fn interrupt_after(mut self, delay: Duration) -> Self {
        self.interrupt_at = Some(Instant::now() + delay);
        self
    }

    pub fn progress(&self) -> &RecordingProgress {
        &self.progress
    }

    pub fn welcomed(&self) -> bool {
        *self.welcomed.lock().unwrap()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn code_blocks(&self) -> Vec<String> {
        self.code_blocks.lock().unwrap().clone()
    }

    pub fn outcomes(&self) -> Vec<String> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl ProgressSink for ScriptedUi {
    fn tick(&self, remaining_secs: u64, label: &str) {
        self.progress.tick(remaining_secs, label);
    }

    fn clear_progress_line(&self) {
        self.progress.clear_progress_line();
    }

    fn notify(&self, event: &ReviewEvent) {
        self.progress.notify(event);
    }
}

#[async_trait]
impl UserInterface for ScriptedUi {
    fn show_welcome(&self) {
        *self.welcomed.lock().unwrap() = true;
    }

    async fn prompt_menu(&mut self) -> Result<Option<String>> {
        Ok(self.menu.pop_front())
    }

    async fn collect_multiline_input(&mut self) -> Result<String> {
        Ok(self.snippets.pop_front().unwrap_or_default())
    }

    fn render_code_block(&self, code: &str) {
        self.code_blocks.lock().unwrap().push(code.to_string());
    }

    fn render_outcome(&self, outcome: &ReviewOutcome) {
        let kind = match outcome {
            ReviewOutcome::Success { .. } => "success",
            ReviewOutcome::RateLimited { .. } => "rate_limited",
            ReviewOutcome::Failed { .. } => "failed",
        };
        self.outcomes.lock().unwrap().push(kind.to_string());
    }

    fn message(&self, _kind: MessageKind, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }

    async fn interrupted(&self) {
        match self.interrupt_at {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending::<()>().await,
        }
    }
}
