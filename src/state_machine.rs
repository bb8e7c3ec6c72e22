//! Conversation turn state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions: the
//! runtime feeds events in, the transition function returns the next state
//! plus a list of effects to execute.

mod effect;
mod event;
mod state;
mod transition;

pub use effect::Effect;
pub use event::Event;
pub use state::{SessionContext, TurnState};
pub use transition::{transition, TransitionError, TransitionResult};
