//! Mock provider and end-to-end session tests
//!
//! The mock enables full runtime testing without real I/O.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{SessionHandle, SessionRuntime};
use crate::ledger::Turn;
use crate::llm::{Generator, ProviderError};
use crate::state_machine::SessionContext;

/// One recorded `continue_turn` call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub history: Vec<Turn>,
    pub text: String,
}

/// Mock generator that returns queued results.
pub struct MockGenerator {
    openings: Mutex<VecDeque<Result<String, ProviderError>>>,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    /// Record of all `continue_turn` calls made.
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            openings: Mutex::new(VecDeque::new()),
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_opening(&self, text: impl Into<String>) {
        self.openings.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_opening_error(&self, error: ProviderError) {
        self.openings.lock().unwrap().push_back(Err(error));
    }

    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_reply_error(&self, error: ProviderError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn initial_turn(&self) -> Result<String, ProviderError> {
        self.openings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::network("no mock opening queued")))
    }

    async fn continue_turn(&self, history: &[Turn], text: &str) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            history: history.to_vec(),
            text: text.to_string(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::network("no mock reply queued")))
    }
}

/// Spawn a runtime over the mock with a fast reveal cadence.
fn start_session(generator: Arc<MockGenerator>) -> SessionHandle {
    let mut context = SessionContext::new("test-session");
    context.reveal_cadence = Duration::from_millis(2);
    context.reply_timeout = Duration::from_millis(500);
    let (runtime, handle) = SessionRuntime::new(context, generator);
    tokio::spawn(runtime.run());
    handle
}

/// Wait for the pending request guard to clear (the turn to finish).
async fn wait_until_idle(handle: &mut SessionHandle) {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            handle
                .input_enabled
                .changed()
                .await
                .expect("runtime exited");
            if *handle.input_enabled.borrow_and_update() {
                return;
            }
        }
    })
    .await
    .expect("turn never completed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::{DEFAULT_OPENING, FALLBACK_LINE};

    #[tokio::test]
    async fn submission_reveals_full_reply_into_history() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_reply("Nice to meet you.");
        let mut handle = start_session(generator.clone());

        handle.submit("hello").await.unwrap();
        wait_until_idle(&mut handle).await;

        let transcript = handle.transcript.borrow().clone();
        assert_eq!(
            transcript,
            vec![Turn::user("hello"), Turn::assistant("Nice to meet you.")]
        );
    }

    #[tokio::test]
    async fn provider_sees_history_without_the_new_submission() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_reply("First reply.");
        generator.queue_reply("Second reply.");
        let mut handle = start_session(generator.clone());

        handle.submit("hello").await.unwrap();
        wait_until_idle(&mut handle).await;
        handle.submit("again").await.unwrap();
        wait_until_idle(&mut handle).await;

        let requests = generator.recorded_requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].history.is_empty());
        assert_eq!(requests[0].text, "hello");
        assert_eq!(
            requests[1].history,
            vec![Turn::user("hello"), Turn::assistant("First reply.")]
        );
        assert_eq!(requests[1].text, "again");
    }

    #[tokio::test]
    async fn opening_line_is_persisted_to_history() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_opening("Where are you from?");
        let mut handle = start_session(generator.clone());

        handle.open().await.unwrap();
        wait_until_idle(&mut handle).await;

        let transcript = handle.transcript.borrow().clone();
        assert_eq!(transcript, vec![Turn::assistant("Where are you from?")]);
    }

    #[tokio::test]
    async fn opening_failure_uses_canned_opening() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_opening_error(ProviderError::server("backend down"));
        let mut handle = start_session(generator.clone());

        handle.open().await.unwrap();
        wait_until_idle(&mut handle).await;

        let transcript = handle.transcript.borrow().clone();
        assert_eq!(transcript, vec![Turn::assistant(DEFAULT_OPENING)]);
    }

    #[tokio::test]
    async fn provider_failure_reveals_fallback_line() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_reply_error(ProviderError::rate_limit("quota exhausted"));
        let mut handle = start_session(generator.clone());

        handle.submit("roast me").await.unwrap();
        wait_until_idle(&mut handle).await;

        let transcript = handle.transcript.borrow().clone();
        assert_eq!(
            transcript,
            vec![Turn::user("roast me"), Turn::assistant(FALLBACK_LINE)]
        );
        // Session recovered: the next submission goes through.
        assert!(*handle.input_enabled.borrow());
    }

    #[tokio::test]
    async fn blank_submission_is_dropped_without_a_turn() {
        let generator = Arc::new(MockGenerator::new());
        let handle = start_session(generator.clone());

        handle.submit("   \t ").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(handle.transcript.borrow().is_empty());
        assert!(*handle.input_enabled.borrow());
        assert!(generator.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn submission_while_turn_in_flight_is_dropped() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_reply("one two three four five six");
        let mut handle = start_session(generator.clone());

        handle.submit("first").await.unwrap();
        handle.submit("second").await.unwrap();
        wait_until_idle(&mut handle).await;

        let transcript = handle.transcript.borrow().clone();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0], Turn::user("first"));
        assert_eq!(generator.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn guard_is_down_while_the_turn_is_in_flight() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_reply("a reply of several words here");
        let mut handle = start_session(generator.clone());

        assert!(*handle.input_enabled.borrow_and_update());
        handle.submit("hello").await.unwrap();

        // First change must be the guard dropping, the next one its return.
        tokio::time::timeout(Duration::from_secs(2), handle.input_enabled.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(!*handle.input_enabled.borrow_and_update());
        wait_until_idle(&mut handle).await;
        assert!(*handle.input_enabled.borrow());
    }

    #[tokio::test]
    async fn reveal_grows_the_trailing_turn_monotonically() {
        let generator = Arc::new(MockGenerator::new());
        generator.queue_reply("Nice to meet you.");
        let mut handle = start_session(generator.clone());

        handle.submit("hi").await.unwrap();

        // Observed trailing texts must each extend the previous one. The
        // watch channel may coalesce, so not every prefix is observed.
        let mut last_seen = String::new();
        let done = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                handle.transcript.changed().await.unwrap();
                let transcript = handle.transcript.borrow_and_update().clone();
                if let Some(turn) = transcript.last() {
                    if turn.role == crate::ledger::Role::Assistant {
                        assert!(
                            turn.text.starts_with(&last_seen),
                            "{:?} does not extend {:?}",
                            turn.text,
                            last_seen
                        );
                        last_seen = turn.text.clone();
                        if last_seen == "Nice to meet you." {
                            return;
                        }
                    }
                }
            }
        })
        .await;
        done.expect("reveal never reached the full reply");
    }
}
