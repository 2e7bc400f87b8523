//! Terminal implementation of [`UserInterface`].

use super::{MessageKind, UserInterface};
use crate::models::ReviewOutcome;
use crate::report;
use crate::review::{ProgressSink, ReviewEvent};
use anyhow::{Context, Result};
use async_trait::async_trait;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

pub struct TerminalUi {
    input: Lines<BufReader<Stdin>>,
    language: String,
    countdown: Mutex<Option<ProgressBar>>,
}

impl TerminalUi {
    /// Create a UI reading from stdin. `language` labels the code panel.
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            input: BufReader::new(tokio::io::stdin()).lines(),
            language: language.into(),
            countdown: Mutex::new(None),
        }
    }

    fn countdown_bar() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            pb.set_style(style);
        }
        pb
    }
}

impl ProgressSink for TerminalUi {
    fn tick(&self, remaining_secs: u64, label: &str) {
        if let Ok(mut slot) = self.countdown.lock() {
            slot.get_or_insert_with(Self::countdown_bar)
                .set_message(format!("{} {} seconds...", label, remaining_secs));
        }
    }

    fn clear_progress_line(&self) {
        if let Ok(mut slot) = self.countdown.lock() {
            if let Some(pb) = slot.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn notify(&self, event: &ReviewEvent) {
        match event {
            ReviewEvent::InitialDelay { wait } => self.message(
                MessageKind::Notice,
                &format!(
                    "\nWaiting {} seconds before starting review (rate limit protection)...",
                    wait.as_secs()
                ),
            ),
            ReviewEvent::Submitting { submission } => {
                debug!("Submitting review (submission {})", submission);
            }
            ReviewEvent::RateLimited {
                attempt,
                max_retries,
                wait,
            } => {
                self.message(
                    MessageKind::Notice,
                    &format!("\nRate limit reached. Attempt {} of {}", attempt, max_retries),
                );
                self.message(
                    MessageKind::Info,
                    &format!(
                        "Waiting {} seconds before retrying (exponential backoff)...",
                        wait.as_secs()
                    ),
                );
            }
        }
    }
}

#[async_trait]
impl UserInterface for TerminalUi {
    fn show_welcome(&self) {
        println!("{}", report::welcome_banner());
    }

    async fn prompt_menu(&mut self) -> Result<Option<String>> {
        print!("{}", report::menu());
        print!("\nSelect review type (1-4): ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        tokio::select! {
            line = self.input.next_line() => {
                line.context("Failed to read menu choice from stdin")
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                Ok(None)
            }
        }
    }

    async fn collect_multiline_input(&mut self) -> Result<String> {
        println!(
            "\n{}",
            style("Enter your code snippet (press Ctrl+D or Ctrl+Z when done):").bold()
        );

        let mut lines = Vec::new();
        loop {
            tokio::select! {
                line = self.input.next_line() => {
                    match line.context("Failed to read code from stdin")? {
                        Some(line) => lines.push(line),
                        None => break,
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        debug!("Collected {} lines of code", lines.len());
        Ok(lines.join("\n"))
    }

    fn render_code_block(&self, code: &str) {
        println!("{}", report::code_panel(code, &self.language));
    }

    fn render_outcome(&self, outcome: &ReviewOutcome) {
        print!("{}", report::outcome(outcome));
    }

    fn message(&self, kind: MessageKind, text: &str) {
        match kind {
            MessageKind::Info => println!("{}", text),
            MessageKind::Notice => println!("{}", style(text).yellow()),
            MessageKind::Error => println!("{}", style(text).red()),
        }
    }

    async fn interrupted(&self) {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available: never report an interrupt
            std::future::pending::<()>().await;
        }
    }
}
