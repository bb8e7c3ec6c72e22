//! Session runtime executor

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use super::SessionHandle;
use crate::ledger::{Ledger, Turn};
use crate::llm::{Generator, ProviderError};
use crate::persona::DEFAULT_OPENING;
use crate::presence::PresenceDriver;
use crate::reveal::{RevealScheduler, RevealUpdate, RevealUpdateKind};
use crate::state_machine::{transition, Effect, Event, SessionContext, TransitionError, TurnState};

/// Session runtime generic over the generation provider.
pub struct SessionRuntime<G: Generator + 'static> {
    context: SessionContext,
    state: TurnState,
    ledger: Ledger,
    generator: Arc<G>,
    presence: PresenceDriver,
    reveal: RevealScheduler,
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    reveal_rx: mpsc::Receiver<RevealUpdate>,
    transcript_tx: watch::Sender<Vec<Turn>>,
    input_tx: watch::Sender<bool>,
}

impl<G: Generator + 'static> SessionRuntime<G> {
    pub fn new(context: SessionContext, generator: G) -> (Self, SessionHandle) {
        let (event_tx, event_rx) = mpsc::channel(32);
        let (reveal_tx, reveal_rx) = mpsc::channel(64);
        let (presence, presence_rx) = PresenceDriver::new();
        let reveal = RevealScheduler::new(reveal_tx).with_cadence(context.reveal_cadence);
        let (transcript_tx, transcript_rx) = watch::channel(Vec::new());
        let (input_tx, input_rx) = watch::channel(true);

        let handle = SessionHandle::new(event_tx.clone(), presence_rx, transcript_rx, input_rx);
        let runtime = Self {
            context,
            state: TurnState::default(),
            ledger: Ledger::new(),
            generator: Arc::new(generator),
            presence,
            reveal,
            event_rx,
            event_tx,
            reveal_rx,
            transcript_tx,
            input_tx,
        };
        (runtime, handle)
    }

    /// Drive the session until every `SessionHandle` is dropped.
    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "session runtime starting");

        loop {
            tokio::select! {
                event = self.event_rx.recv() => {
                    match event {
                        Some(event) => self.process_event(event),
                        None => break,
                    }
                }
                Some(update) = self.reveal_rx.recv() => {
                    self.handle_reveal_update(update);
                }
            }
        }

        self.presence.stop();
        self.reveal.cancel();
        tracing::info!(session_id = %self.context.session_id, "session runtime stopped");
    }

    /// Gate reveal updates by job id: a tick from a superseded job is
    /// discarded before it can become an event.
    fn handle_reveal_update(&mut self, update: RevealUpdate) {
        if !self.reveal.is_active(update.job) {
            tracing::debug!(job = update.job, "discarding update from superseded reveal job");
            return;
        }
        match update.kind {
            RevealUpdateKind::Progress { prefix } => {
                self.process_event(Event::RevealProgress { prefix });
            }
            RevealUpdateKind::Done => {
                self.reveal.mark_done(update.job);
                self.process_event(Event::RevealComplete);
            }
        }
    }

    /// One pass through the state machine: transition, execute effects in
    /// order, publish the new presentation state. Runs to completion on the
    /// runtime task, so no event can observe a half-applied effect list.
    fn process_event(&mut self, event: Event) {
        let result = match transition(self.state, &self.context, event) {
            Ok(result) => result,
            Err(error @ (TransitionError::EmptyInput | TransitionError::TurnInFlight)) => {
                tracing::debug!(reason = %error, "submission dropped");
                return;
            }
            Err(error) => {
                tracing::warn!(error = %error, "event dropped");
                return;
            }
        };

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
        self.publish();
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendUserTurn { text } => self.ledger.push(Turn::user(text)),
            Effect::OpenReply => self.ledger.open_reply(),
            Effect::ExtendReply { prefix } => self.ledger.extend_reply(&prefix),
            Effect::SealReply => self.ledger.seal_reply(),
            Effect::StartPresence { mode, pace_hint } => self.presence.start(mode, pace_hint),
            Effect::StopPresence => self.presence.stop(),
            Effect::RequestOpening => self.request_opening(),
            Effect::RequestReply { text } => self.request_reply(text),
            Effect::BeginReveal { text } => {
                self.reveal.begin(&text);
            }
        }
    }

    /// Call the provider for the opening line off the runtime task. A failed
    /// or timed-out call degrades to the canned opening rather than the
    /// fallback line: there is nothing to roast yet.
    fn request_opening(&self) {
        let generator = Arc::clone(&self.generator);
        let events = self.event_tx.clone();
        let deadline = self.context.reply_timeout;
        tokio::spawn(async move {
            let text = match tokio::time::timeout(deadline, generator.initial_turn()).await {
                Ok(Ok(text)) => text,
                Ok(Err(error)) => {
                    tracing::warn!(kind = ?error.kind, error = %error, "opening call failed, using canned opening");
                    DEFAULT_OPENING.to_string()
                }
                Err(_) => {
                    tracing::warn!("opening call timed out, using canned opening");
                    DEFAULT_OPENING.to_string()
                }
            };
            let _ = events.send(Event::ReplyReady { text }).await;
        });
    }

    /// Call the provider with the pre-submission history and the new text.
    /// This effect runs before `AppendUserTurn`, so the snapshot taken here
    /// is the context the provider expects.
    fn request_reply(&self, text: String) {
        let history = self.ledger.snapshot();
        let generator = Arc::clone(&self.generator);
        let events = self.event_tx.clone();
        let deadline = self.context.reply_timeout;
        tokio::spawn(async move {
            let event = match tokio::time::timeout(deadline, generator.continue_turn(&history, &text))
                .await
            {
                Ok(Ok(text)) => Event::ReplyReady { text },
                Ok(Err(error)) => Event::ReplyFailed { error },
                Err(_) => Event::ReplyFailed {
                    error: ProviderError::network("provider call timed out"),
                },
            };
            let _ = events.send(event).await;
        });
    }

    fn publish(&self) {
        self.transcript_tx.send_replace(self.ledger.snapshot());
        let enabled = self.state.accepts_input();
        self.input_tx.send_if_modified(|current| {
            if *current == enabled {
                false
            } else {
                *current = enabled;
                true
            }
        });
    }
}
