//! Symbiosis chat — a side conversation about one report excerpt.
//!
//! The transcript is append-only and strictly ordered: user messages in the
//! order they were sent, replies in the order they arrived. At most one reply
//! is awaited at a time; new input is rejected while one is pending.

use thiserror::Error;

use crate::models::chat::{ChatMessage, SymbiosisContext};

/// Canned reply shown when fetching the real one fails. The turn still
/// completes so the conversation can continue.
const REPLY_FAILURE_TEXT: &str =
    "I'm sorry, I encountered an error connecting to my core systems. Please try again.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("A reply is already pending")]
    ReplyPending,

    #[error("Message text cannot be empty")]
    EmptyMessage,
}

#[derive(Debug)]
pub struct SymbiosisChat {
    context: SymbiosisContext,
    messages: Vec<ChatMessage>,
    reply_pending: bool,
}

impl SymbiosisChat {
    /// Opens a conversation seeded with the AI greeting for the selected
    /// excerpt.
    pub fn new(context: SymbiosisContext) -> Self {
        let greeting = format!(
            "Nexus Symbiosis activated. You've selected the topic: **{}**. The original finding was: *\"{}\"*. How can I elaborate or provide updated information on this specific point?",
            context.topic, context.original_content
        );
        SymbiosisChat {
            context,
            messages: vec![ChatMessage::ai(greeting)],
            reply_pending: false,
        }
    }

    pub fn context(&self) -> &SymbiosisContext {
        &self.context
    }

    /// Full transcript, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_reply_pending(&self) -> bool {
        self.reply_pending
    }

    /// Appends a user message and marks a reply pending. Returns the history
    /// to submit to the backend. Rejected while a reply is outstanding or for
    /// blank input.
    pub fn send(&mut self, text: &str) -> Result<Vec<ChatMessage>, ChatError> {
        if self.reply_pending {
            return Err(ChatError::ReplyPending);
        }
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.messages.push(ChatMessage::user(text));
        self.reply_pending = true;
        Ok(self.messages.clone())
    }

    /// Appends the backend's reply and unblocks input.
    pub fn resolve_reply(&mut self, text: impl Into<String>) {
        if !self.reply_pending {
            return;
        }
        self.messages.push(ChatMessage::ai(text.into()));
        self.reply_pending = false;
    }

    /// Records a failed reply as the canned apology and unblocks input.
    pub fn fail_reply(&mut self) {
        self.resolve_reply(REPLY_FAILURE_TEXT);
    }
}
