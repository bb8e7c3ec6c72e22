//! Turn cycle states and session configuration

use std::time::Duration;

use crate::reveal::REVEAL_CADENCE;

/// Default bound on the provider call. Without it a network stall leaves the
/// session stuck in `AwaitingReply`; a timed-out call takes the fallback path
/// instead.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(30);

/// State of the request/response cycle. `Idle` is both the initial state and
/// the resting state between turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    /// Ready for user input, no pending operations.
    #[default]
    Idle,

    /// A provider call is in flight.
    AwaitingReply,

    /// The reply is being revealed word by word.
    Revealing,
}

impl TurnState {
    /// Whether a new submission would be accepted. This is the pending
    /// request guard: true only when no turn is in flight.
    pub fn accepts_input(self) -> bool {
        matches!(self, TurnState::Idle)
    }
}

/// Immutable configuration for a session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    /// Deadline for each provider call.
    pub reply_timeout: Duration,
    /// Tick period of the word-by-word reveal.
    pub reveal_cadence: Duration,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            reveal_cadence: REVEAL_CADENCE,
        }
    }
}
