//! Conversation-related types.

use chrono::{DateTime, Local};

/// Who produced a given transcript message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    /// The planning agent.
    Agent,
    /// The human traveler.
    User,
}

/// A single finalized message in the conversation.
#[derive(Clone, Debug)]
pub struct TranscriptMessage {
    speaker: Speaker,
    text: String,
    timestamp: DateTime<Local>,
}

impl TranscriptMessage {
    #[inline]
    pub(crate) fn now(speaker: Speaker, text: String) -> Self {
        Self {
            speaker,
            text,
            timestamp: Local::now(),
        }
    }

    /// Returns who spoke this message.
    #[inline]
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    /// Returns the message text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns when the message was recorded.
    #[inline]
    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

/// Represents a conversation.
///
/// Messages are appended in arrival order and never reordered or
/// dropped, so the accumulated user text the extractor sees is stable
/// across re-scans.
#[derive(Clone, Default, Debug)]
pub struct Conversation {
    items: Vec<TranscriptMessage>,
}

impl Conversation {
    /// Returns all messages in arrival order.
    #[inline]
    pub fn items(&self) -> &[TranscriptMessage] {
        &self.items
    }

    #[inline]
    pub(crate) fn push(&mut self, msg: TranscriptMessage) {
        self.items.push(msg);
    }

    /// Returns every user message joined with single spaces.
    ///
    /// This is the text the extractor operates on: details mentioned
    /// across multiple utterances combine into one extraction.
    pub fn user_text(&self) -> String {
        let mut text = String::new();
        for item in &self.items {
            if item.speaker != Speaker::User {
                continue;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&item.text);
        }
        text
    }
}
