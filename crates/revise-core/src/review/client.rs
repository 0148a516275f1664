//! Review service seam and the OpenAI-compatible chat completions client.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::prompt::REVIEW_SYSTEM_PROMPT;
use crate::error::ReviewError;

/// A text-completion collaborator that can review a timetable.
pub trait ReviewService: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Send one prompt, return the raw reply text.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, ReviewError>> + Send;
}

/// A chat message with role and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Request body for chat completions.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

/// Response from chat completions.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Clone)]
pub struct LlmReviewClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

impl LlmReviewClient {
    /// Create a client for the full completions URL.
    pub fn new(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            temperature: 0.2,
            max_tokens: 2048,
        }
    }

    /// Transport-level timeout for the single request.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ReviewError> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ReviewService for LlmReviewClient {
    fn name(&self) -> &str {
        "llm"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ReviewError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: REVIEW_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ReviewError::Unavailable(format!(
                "review request failed (HTTP {status}): {body}"
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            ReviewError::MalformedResponse(format!("completion envelope: {e}"))
        })?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ReviewError::MalformedResponse("no choices in completion".to_string()))
    }
}
