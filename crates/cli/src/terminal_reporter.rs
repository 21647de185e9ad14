//! Terminal output for the `toolpack` binary
//!
//! Status lines carry an emoji prefix with a plain-text fallback for
//! terminals without Unicode support, and are colored only when enabled.
//! Errors go to stderr, everything else to stdout.

use std::fmt::Display;

use console::{Emoji, style};

static ERROR_EMOJI: Emoji<'_, '_> = Emoji("❌ ", "[E] ");
static INFO_EMOJI: Emoji<'_, '_> = Emoji("ℹ️ ", "[I] ");
static PROGRESS_EMOJI: Emoji<'_, '_> = Emoji("• ", " • ");
static SUGGESTION_EMOJI: Emoji<'_, '_> = Emoji("✨ ", "[S] ");
static SUCCESS_EMOJI: Emoji<'_, '_> = Emoji("✅ ", "OK ");

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MessageType {
    Error,
    Info,
    Progress,
    Success,
    Suggestion,
}

/// Styled status lines for install progress and results
#[derive(Debug, Clone, Copy)]
pub struct TerminalReporter {
    use_colors: bool,
}

impl TerminalReporter {
    #[must_use]
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub(crate) fn status_line(self, message_type: MessageType, message: impl Display) -> String {
        let prefix = match message_type {
            MessageType::Error => ERROR_EMOJI,
            MessageType::Info => INFO_EMOJI,
            MessageType::Progress => PROGRESS_EMOJI,
            MessageType::Success => SUCCESS_EMOJI,
            MessageType::Suggestion => SUGGESTION_EMOJI,
        };

        if !self.use_colors {
            return match message_type {
                MessageType::Suggestion => format!("{prefix}Suggestion: {message}"),
                _ => format!("{prefix}{message}"),
            };
        }

        let formatted_message = match message_type {
            MessageType::Error => style(message).for_stderr().red().bold().to_string(),
            MessageType::Info => style(message).blue().to_string(),
            MessageType::Progress => style(message).dim().to_string(),
            MessageType::Success => style(message).green().to_string(),
            MessageType::Suggestion => {
                format!("{}: {message}", style("Suggestion").yellow().bold())
            }
        };

        format!("{prefix}{formatted_message}")
    }

    pub(crate) fn report_progress(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Progress, message));
    }

    pub(crate) fn report_success(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Success, message));
    }

    pub(crate) fn report_info(self, message: impl Display) {
        println!("{}", self.status_line(MessageType::Info, message));
    }

    pub(crate) fn report_suggestion(self, message: impl Display) {
        eprintln!("{}", self.status_line(MessageType::Suggestion, message));
    }

    pub(crate) fn report_error(self, message: impl Display) {
        eprintln!("{}", self.status_line(MessageType::Error, message));
    }
}
