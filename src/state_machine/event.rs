//! Events that drive the turn cycle

use crate::llm::ProviderError;

/// Events that trigger state transitions.
#[derive(Debug)]
pub enum Event {
    // User events
    /// Session start: request the opening line with no user text (the
    /// synthetic zero-th turn).
    Open,
    /// A user submission.
    Submit { text: String },

    // Provider events
    ReplyReady { text: String },
    ReplyFailed { error: ProviderError },

    // Reveal events. The runtime discards updates from superseded jobs
    // before they become events, so these always refer to the current job.
    RevealProgress { prefix: String },
    RevealComplete,
}
