//! Groq implementation of the LLM client.
//!
//! Groq exposes an OpenAI-compatible chat completions endpoint. Each call is a
//! single `POST` raced against a timer: if the timer wins, the request future
//! is dropped (which aborts the in-flight HTTP exchange) and `Timeout` is
//! reported. Non-success statuses are surfaced with their body verbatim.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::base::{
    config::Config,
    types::{ConversationTurn, Res},
};

use super::{CompletionError, CompletionResult, GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the groq implementation.

impl LlmClient {
    pub fn groq(config: &Config) -> Res<Self> {
        let client = GroqLlmClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ConversationTurn],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    #[serde(default)]
    message: Option<ChatCompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

// Specific implementations.

/// Groq LLM client implementation.
#[derive(Clone)]
pub struct GroqLlmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl GroqLlmClient {
    /// Create a new Groq LLM client.
    #[instrument(name = "GroqLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            http,
            endpoint: config.groq_endpoint.clone(),
            api_key: config.groq_api_key.clone(),
            model: config.groq_model.clone(),
            temperature: config.groq_temperature,
            max_tokens: config.groq_max_tokens,
            timeout: Duration::from_secs(config.groq_timeout_secs),
        })
    }

    /// Perform the HTTP exchange without any timeout.
    async fn send(&self, turns: &[ConversationTurn]) -> CompletionResult {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: turns,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::RemoteError { status: status.as_u16(), body });
        }

        extract_content(&body)
    }
}

#[async_trait]
impl GenericLlmClient for GroqLlmClient {
    #[instrument(skip_all, fields(model = %self.model, turns = turns.len()))]
    async fn complete(&self, turns: &[ConversationTurn]) -> CompletionResult {
        debug!("Sending completion request ...");

        match timeout(self.timeout, self.send(turns)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Completion request timed out after {:?}", self.timeout);
                Err(CompletionError::Timeout)
            }
        }
    }
}

/// Pull the first choice's text out of a successful response body.
fn extract_content(body: &str) -> CompletionResult {
    let response: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .unwrap_or_default();

    let content = content.trim();

    if content.is_empty() {
        return Err(CompletionError::EmptyResponse);
    }

    Ok(content.to_string())
}

// Tests.
