//! Chat-completions inference client
//!
//! Talks to an OpenAI-compatible `/v1/chat/completions` endpoint (vLLM in
//! production). Only the assistant message text is returned; decoding and
//! validating the model's JSON happens in the classifier.

use async_trait::async_trait;
use bankrev_common::config::InferenceConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("bankrev-ai/", env!("CARGO_PKG_VERSION"));

/// Error bodies are cut to this many characters before logging
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Inference client errors
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Inference endpoint returned {0}: {1}")]
    Status(u16, String),

    #[error("Malformed response envelope: {0}")]
    Envelope(String),

    /// Client-side problem; retrying cannot help
    #[error("Failed to build request: {0}")]
    Build(String),
}

impl InferenceError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, InferenceError::Build(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body of `POST /v1/chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<AssistantMessage>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// `choices[0].message.content`
    fn into_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}

/// Anything that can answer a chat request with the assistant's text
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError>;
}

/// vLLM / OpenAI-compatible HTTP backend
pub struct VllmClient {
    http_client: Client,
    url: String,
    timeout: Duration,
}

impl VllmClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, InferenceError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout())
            .build()
            .map_err(|e| InferenceError::Build(e.to_string()))?;

        Ok(Self {
            http_client,
            url: config.url.clone(),
            timeout: config.timeout(),
        })
    }

    fn map_send_error(&self, error: reqwest::Error) -> InferenceError {
        if error.is_timeout() {
            InferenceError::Timeout(self.timeout)
        } else if error.is_builder() {
            InferenceError::Build(error.to_string())
        } else {
            InferenceError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl InferenceBackend for VllmClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, InferenceError> {
        debug!(url = %self.url, model = %request.model, "Sending chat completion request");

        let response = self
            .http_client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(InferenceError::Status(status.as_u16(), body));
        }

        let envelope: ChatResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                InferenceError::Timeout(self.timeout)
            } else {
                InferenceError::Envelope(e.to_string())
            }
        })?;

        envelope.into_content().ok_or_else(|| {
            InferenceError::Envelope("missing choices[0].message.content".to_string())
        })
    }
}
