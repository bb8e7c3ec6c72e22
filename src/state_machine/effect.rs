//! Effects produced by state transitions

use crate::presence::PresenceMode;

/// Effects to be executed by the runtime after a state transition. Effects
/// run in list order; some transitions depend on it (see `transition`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a user turn to the ledger.
    AppendUserTurn { text: String },

    /// Open an empty in-progress assistant turn at the end of the ledger.
    OpenReply,

    /// Grow the in-progress assistant turn to the given prefix.
    ExtendReply { prefix: String },

    /// Mark the in-progress assistant turn complete.
    SealReply,

    /// Start the avatar oscillating; `pace_hint` is the reply's word count
    /// and bounds the talking animation.
    StartPresence {
        mode: PresenceMode,
        pace_hint: Option<usize>,
    },

    /// Cancel the avatar timer and settle to neutral.
    StopPresence,

    /// Call the provider for the session's opening line.
    RequestOpening,

    /// Call the provider with the current history and the new user text.
    RequestReply { text: String },

    /// Start a reveal job over the reply text.
    BeginReveal { text: String },
}
