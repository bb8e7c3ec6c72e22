//! Session runtime
//!
//! Owns the event loop that drives a session: it feeds events through the
//! pure transition function, executes the resulting effects, and publishes
//! presentation state over watch channels. All ordering hazards (stale timer
//! ticks, superseded reveal jobs, double submissions) are resolved here, in
//! one place, on one task.

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::ledger::Turn;
use crate::presence::Presence;
use crate::state_machine::Event;

/// The runtime task exited and can no longer accept input.
#[derive(Debug, Error)]
#[error("session runtime has shut down")]
pub struct SessionClosed;

/// Handle to interact with a running session.
///
/// The watch receivers are the whole presentation surface: a renderer
/// subscribes to them and never touches runtime internals. Receivers coalesce
/// under load, always yielding the latest value.
pub struct SessionHandle {
    events: mpsc::Sender<Event>,
    /// Avatar animation state.
    pub presence: watch::Receiver<Presence>,
    /// Full conversation history, including the partially revealed reply.
    pub transcript: watch::Receiver<Vec<Turn>>,
    /// The pending request guard: false while a turn is in flight.
    pub input_enabled: watch::Receiver<bool>,
}

impl SessionHandle {
    pub(crate) fn new(
        events: mpsc::Sender<Event>,
        presence: watch::Receiver<Presence>,
        transcript: watch::Receiver<Vec<Turn>>,
        input_enabled: watch::Receiver<bool>,
    ) -> Self {
        Self {
            events,
            presence,
            transcript,
            input_enabled,
        }
    }

    /// Request the opening line (the synthetic zero-th turn).
    pub async fn open(&self) -> Result<(), SessionClosed> {
        self.events
            .send(Event::Open)
            .await
            .map_err(|_| SessionClosed)
    }

    /// Submit user text. Blank or in-flight submissions are dropped by the
    /// runtime; sending them is not an error.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SessionClosed> {
        self.events
            .send(Event::Submit { text: text.into() })
            .await
            .map_err(|_| SessionClosed)
    }
}
