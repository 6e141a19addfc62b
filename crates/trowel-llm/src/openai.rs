//! OpenAI-compatible chat-completions client
//!
//! Blocking request/response against a chat-completions endpoint. The
//! pipeline is strictly sequential, so the sync `ChatModel` impl drives an
//! owned runtime; the async inherent method is available for callers that
//! already run inside one.

use crate::LlmError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trowel_domain::traits::{ChatModel, ChatOptions, ChatRequest, ChatResponse};
use trowel_domain::TokenUsage;

/// Default API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default timeout for a single call (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Chat client against an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChatModel {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f64,
    presence_penalty: f64,
    frequency_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiReplyMessage,
}

#[derive(Deserialize)]
struct ApiReplyMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

impl OpenAiChatModel {
    /// Create a client for the given endpoint and API key.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Create a client against the default endpoint.
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, api_key)
    }

    /// Execute one chat call.
    ///
    /// # Errors
    ///
    /// - `RateLimited` when the endpoint answers HTTP 429
    /// - `ModelNotAvailable` on HTTP 404
    /// - `Communication` on transport failures and other non-success codes
    /// - `InvalidResponse` when the body does not match the API shape
    pub async fn complete_async(
        &self,
        request: &ChatRequest,
        options: &ChatOptions,
    ) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let body = ApiRequest {
            model: &options.model,
            messages: vec![
                ApiMessage { role: "system", content: &request.system },
                ApiMessage { role: "user", content: &request.user },
            ],
            temperature: options.temperature,
            presence_penalty: options.presence_penalty,
            frequency_penalty: options.frequency_penalty,
            max_tokens: options.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(options.model.clone()));
        }
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        Ok(ChatResponse {
            content: choice.message.content,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

impl ChatModel for OpenAiChatModel {
    type Error = LlmError;

    fn complete(
        &self,
        request: &ChatRequest,
        options: &ChatOptions,
    ) -> Result<ChatResponse, Self::Error> {
        // Blocking wrapper around the async call; the pipeline never runs
        // inside an outer runtime.
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| LlmError::Communication(format!("Failed to start runtime: {}", e)))?;
        runtime.block_on(self.complete_async(request, options))
    }
}
