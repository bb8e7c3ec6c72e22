//! Conversation history ledger
//!
//! An ordered, append-only log of turns. The ledger is the literal context
//! replayed to the stateless generation provider on every call, so insertion
//! order is significant. At most one turn is in progress (partially revealed)
//! at any time, and it is always the last element.

use serde::{Deserialize, Serialize};

/// Who spoke a turn. Wire names match the provider's role vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    #[serde(rename = "model")]
    Assistant,
}

/// One message in the conversation sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Ordered, append-only record of turns.
///
/// Whether the trailing assistant turn is still being revealed is an explicit
/// flag, not a "last element has the assistant role" heuristic, so there is
/// never ambiguity about which entry is mutable.
#[derive(Debug, Default)]
pub struct Ledger {
    turns: Vec<Turn>,
    reply_open: bool,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn. An assistant turn appended while a reply is in progress
    /// replaces the trailing turn's text instead of creating a duplicate
    /// entry.
    pub fn push(&mut self, turn: Turn) {
        if self.reply_open && turn.role == Role::Assistant {
            if let Some(last) = self.turns.last_mut() {
                last.text = turn.text;
                return;
            }
        }
        self.turns.push(turn);
    }

    /// Begin a new in-progress assistant reply (an empty trailing turn that
    /// `extend_reply` grows word by word).
    pub fn open_reply(&mut self) {
        self.seal_reply();
        self.turns.push(Turn::assistant(""));
        self.reply_open = true;
    }

    /// Replace the in-progress reply's text with a longer prefix. A no-op
    /// when no reply is open (a stale reveal update that lost its job).
    pub fn extend_reply(&mut self, prefix: &str) {
        if !self.reply_open {
            return;
        }
        if let Some(last) = self.turns.last_mut() {
            last.text = prefix.to_string();
        }
    }

    /// Mark the in-progress reply as complete. Idempotent.
    pub fn seal_reply(&mut self) {
        self.reply_open = false;
    }

    /// Whether the trailing assistant turn is still being revealed.
    #[allow(dead_code)]
    pub fn reply_open(&self) -> bool {
        self.reply_open
    }

    /// Owned copy of the full history, for submission to the provider and
    /// for transcript display. Caller mutation cannot affect the ledger.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    #[allow(dead_code)]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }
}
