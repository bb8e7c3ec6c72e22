//! Generation provider abstraction
//!
//! The provider is stateless between calls: the full conversation history is
//! replayed to it on every request. Given identical history and input the
//! output may still vary, so callers must not assume reproducibility.

mod error;
mod gemini;

pub use error::{ProviderError, ProviderErrorKind};
pub use gemini::{GeminiClient, DEFAULT_MODEL};

use async_trait::async_trait;
use std::sync::Arc;

use crate::ledger::Turn;

/// Common interface for generation providers.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce the session's opening line (no user text yet).
    async fn initial_turn(&self) -> Result<String, ProviderError>;

    /// Produce a reply to `text` given the conversation so far. `history` is
    /// the context before this submission; the new text travels separately.
    async fn continue_turn(&self, history: &[Turn], text: &str) -> Result<String, ProviderError>;
}

#[async_trait]
impl<T: Generator + ?Sized> Generator for Arc<T> {
    async fn initial_turn(&self) -> Result<String, ProviderError> {
        (**self).initial_turn().await
    }

    async fn continue_turn(&self, history: &[Turn], text: &str) -> Result<String, ProviderError> {
        (**self).continue_turn(history, text).await
    }
}
