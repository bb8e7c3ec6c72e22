//! Pure state transition function
//!
//! Given the same state and event this always produces the same result, with
//! no I/O side effects. All timer and provider work happens in the runtime's
//! effect executor.

use thiserror::Error;

use super::{Effect, Event, SessionContext, TurnState};
use crate::persona::FALLBACK_LINE;
use crate::presence::PresenceMode;

/// Result of a state transition.
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Rejections produced by `transition`. None of these are fatal: the runtime
/// drops the event and the session stays usable.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("submission was blank after trimming")]
    EmptyInput,
    #[error("a turn is already in flight, submission dropped")]
    TurnInFlight,
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function.
pub fn transition(
    state: TurnState,
    _context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Submission handling
        // ============================================================

        // Idle + Submit -> AwaitingReply
        //
        // Effect order matters here: the provider call snapshots the ledger
        // when it executes, and the history it sends must be the context
        // *before* this submission (the new text travels separately), so the
        // request precedes the append.
        (TurnState::Idle, Event::Submit { text }) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(TransitionError::EmptyInput);
            }
            Ok(TransitionResult::new(TurnState::AwaitingReply)
                .with_effect(Effect::StartPresence {
                    mode: PresenceMode::Thinking,
                    pace_hint: None,
                })
                .with_effect(Effect::RequestReply {
                    text: trimmed.to_string(),
                })
                .with_effect(Effect::AppendUserTurn {
                    text: trimmed.to_string(),
                }))
        }

        // Idle + Open -> AwaitingReply (synthetic zero-th turn)
        (TurnState::Idle, Event::Open) => Ok(TransitionResult::new(TurnState::AwaitingReply)
            .with_effect(Effect::StartPresence {
                mode: PresenceMode::Thinking,
                pace_hint: None,
            })
            .with_effect(Effect::RequestOpening)),

        // Busy states + Submit -> dropped, no queueing
        (TurnState::AwaitingReply | TurnState::Revealing, Event::Submit { .. }) => {
            Err(TransitionError::TurnInFlight)
        }

        // ============================================================
        // Reply handling
        // ============================================================

        // AwaitingReply + ReplyReady -> Revealing
        (TurnState::AwaitingReply, Event::ReplyReady { text }) => Ok(begin_revealing(text)),

        // AwaitingReply + ReplyFailed -> Revealing, with the in-character
        // fallback line in place of the reply. The failure never propagates.
        (TurnState::AwaitingReply, Event::ReplyFailed { error }) => {
            tracing::warn!(kind = ?error.kind, error = %error, "provider call failed, revealing fallback");
            Ok(begin_revealing(FALLBACK_LINE.to_string()))
        }

        // ============================================================
        // Reveal handling
        // ============================================================

        // Revealing + RevealProgress -> Revealing (grow the trailing turn)
        (TurnState::Revealing, Event::RevealProgress { prefix }) => {
            Ok(TransitionResult::new(TurnState::Revealing)
                .with_effect(Effect::ExtendReply { prefix }))
        }

        // Revealing + RevealComplete -> Idle (guard clears with the state)
        (TurnState::Revealing, Event::RevealComplete) => {
            Ok(TransitionResult::new(TurnState::Idle)
                .with_effect(Effect::SealReply)
                .with_effect(Effect::StopPresence))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} in {state:?}"
        ))),
    }
}

/// Shared tail of the success and fallback paths: open the reply turn, start
/// the talking animation paced by the reply length, and begin the reveal.
fn begin_revealing(text: String) -> TransitionResult {
    let word_count = text.split_whitespace().count();
    TransitionResult::new(TurnState::Revealing)
        .with_effect(Effect::OpenReply)
        .with_effect(Effect::StartPresence {
            mode: PresenceMode::Talking,
            pace_hint: Some(word_count),
        })
        .with_effect(Effect::BeginReveal { text })
}
