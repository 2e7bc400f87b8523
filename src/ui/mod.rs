//! User interaction.
//!
//! The session loop only talks to [`UserInterface`]; [`TerminalUi`] is the
//! stdin/stdout implementation.

pub mod terminal;

pub use terminal::TerminalUi;

use crate::models::ReviewOutcome;
use crate::review::ProgressSink;
use anyhow::Result;
use async_trait::async_trait;

/// Tone of a one-line message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Notice,
    Error,
}

#[async_trait]
pub trait UserInterface: ProgressSink {
    fn show_welcome(&self);

    /// Show the review menu and read the user's choice.
    ///
    /// Returns `None` when input is closed or interrupted.
    async fn prompt_menu(&mut self) -> Result<Option<String>>;

    /// Read a code snippet until end-of-input or interrupt.
    async fn collect_multiline_input(&mut self) -> Result<String>;

    fn render_code_block(&self, code: &str);

    fn render_outcome(&self, outcome: &ReviewOutcome);

    fn message(&self, kind: MessageKind, text: &str);

    /// Resolves when the user asks to interrupt (Ctrl+C).
    async fn interrupted(&self);
}
