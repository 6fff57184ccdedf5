pub mod groq;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

use crate::base::types::ConversationTurn;

// Types.

/// Why a completion call produced no usable text.
///
/// Every variant is a single-attempt terminal outcome; nothing here is retried.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The endpoint did not answer within the configured timeout; the request was dropped.
    #[error("completion request timed out")]
    Timeout,
    /// The endpoint answered with a non-success status.
    #[error("completion endpoint returned {status}: {body}")]
    RemoteError { status: u16, body: String },
    /// The endpoint answered, but the first choice had no text after trimming.
    #[error("completion endpoint returned an empty response")]
    EmptyResponse,
    /// The endpoint answered with a body that is not a chat completion.
    #[error("completion response could not be decoded: {0}")]
    MalformedResponse(String),
    /// The request never got a response (DNS, TLS, connection reset, ...).
    #[error("completion request failed: {0}")]
    Transport(String),
}

pub type CompletionResult = Result<String, CompletionError>;

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for interacting with large language models.
/// Implementing this trait allows different completion providers to be used with the bot.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Send an ordered conversation to the model and return its trimmed reply.
    async fn complete(&self, turns: &[ConversationTurn]) -> CompletionResult;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
