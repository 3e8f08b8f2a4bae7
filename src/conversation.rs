//! The message log and the pending-request flag.
//!
//! Messages are only ever appended. A submission moves the conversation from
//! idle to sending via [`Conversation::begin`], and the matching
//! [`Conversation::settle`] appends the bot's turn(s) and returns to idle.

use thiserror::Error;
use tracing::{info, warn};

use crate::composer::EmptySubmission;
use crate::recommend::{DispatchError, Recommendation};

pub const GREETING: &str = "Hi! 👋 What would you like to cook today?\n\
Examples: \"Quick vegan dinner with tofu\", \"Gluten-free dessert with chocolate\"";

/// Result of one round trip to the recommendation service
pub type Outcome = Result<Recommendation, DispatchError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// Supplementary "Sources: ..." line rather than an answer
    pub is_source: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            is_source: false,
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Bot,
            content: content.into(),
            is_source: false,
        }
    }

    pub fn sources(sources: &[String]) -> Self {
        Self {
            role: ChatRole::Bot,
            content: display_text(&format!("Sources: {}", sources.join(" • "))),
            is_source: true,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Empty(#[from] EmptySubmission),
    #[error("a request is already in flight")]
    Busy,
}

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    pending: bool,
}

impl Conversation {
    /// Conversation opened with the assistant's greeting
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage::bot(GREETING)],
            pending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Record the user's turn and mark a request as in flight.
    pub fn begin(&mut self, query: &str) -> Result<(), SubmitError> {
        if self.pending {
            return Err(SubmitError::Busy);
        }
        self.messages.push(ChatMessage::user(query));
        self.pending = true;
        Ok(())
    }

    /// Append the bot's reply (or an error line) and clear the pending flag.
    pub fn settle(&mut self, outcome: Outcome) {
        match outcome {
            Ok(rec) => {
                self.messages.push(ChatMessage::bot(display_text(rec.answer.text())));
                if !rec.sources.is_empty() {
                    self.messages.push(ChatMessage::sources(&rec.sources));
                }
                info!(
                    sources = rec.sources.len(),
                    retrieved = ?rec.retrieved_count,
                    "recommendation received"
                );
            }
            Err(err) => {
                warn!(error = %err, "recommendation request failed");
                let description = err.to_string();
                let description = if description.trim().is_empty() {
                    "Unknown error".to_string()
                } else {
                    description
                };
                self.messages
                    .push(ChatMessage::bot(display_text(&format!("Error: {}", description))));
            }
        }
        self.pending = false;
    }
}

/// Normalize untrusted service text for the terminal.
///
/// Line endings become `\n` and tabs become spaces. Every other control
/// character is dropped so the service cannot emit escape sequences.
pub fn display_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            }
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
