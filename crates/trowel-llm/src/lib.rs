//! Trowel LLM Provider Layer
//!
//! Implementations of the `ChatModel` trait from `trowel-domain`.
//!
//! # Providers
//!
//! - `MockChatModel`: deterministic scripted mock for testing
//! - `OpenAiChatModel`: OpenAI-compatible chat-completions API client
//!
//! # Examples
//!
//! ```
//! use trowel_llm::MockChatModel;
//! use trowel_domain::traits::{ChatModel, ChatOptions, ChatRequest};
//!
//! let model = MockChatModel::new("{}");
//! let request = ChatRequest { system: "sys".into(), user: "usr".into() };
//! let reply = model.complete(&request, &ChatOptions::default()).unwrap();
//! assert_eq!(reply.content.as_deref(), Some("{}"));
//! ```

#![warn(missing_docs)]

pub mod openai;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use trowel_domain::traits::{ChatModel, ChatOptions, ChatRequest, ChatResponse};
use trowel_domain::TokenUsage;

pub use openai::OpenAiChatModel;

/// Errors that can occur during chat-model calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Rate limit exceeded (retryable class)
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Response body did not match the expected API shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The model returned no content at all
    #[error("Empty reply from model")]
    EmptyReply,

    /// Model not available on the endpoint
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

impl LlmError {
    /// Whether the retry policy may re-attempt the call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LlmError::RateLimited)
    }
}

/// One scripted mock reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful reply with this content
    Content(String),
    /// Reply with `content: None`
    Empty,
    /// Fail with a rate-limit error
    RateLimited,
    /// Fail with a communication error
    Error(String),
}

/// Scripted mock chat model for deterministic testing.
///
/// Replies are consumed front-to-back from a script; once the script is
/// exhausted the fixed default response is returned. Every successful reply
/// reports a usage of one prompt token and one completion token so tests
/// can assert accumulation.
///
/// # Examples
///
/// ```
/// use trowel_llm::{MockChatModel, MockReply};
/// use trowel_domain::traits::{ChatModel, ChatOptions, ChatRequest};
///
/// let model = MockChatModel::new("default");
/// model.push(MockReply::Content("first".into()));
///
/// let request = ChatRequest { system: String::new(), user: String::new() };
/// let opts = ChatOptions::default();
/// assert_eq!(model.complete(&request, &opts).unwrap().content.as_deref(), Some("first"));
/// assert_eq!(model.complete(&request, &opts).unwrap().content.as_deref(), Some("default"));
/// assert_eq!(model.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockChatModel {
    default_response: String,
    script: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockChatModel {
    /// Create a mock returning `response` for every unscripted call.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append one reply to the script.
    pub fn push(&self, reply: MockReply) {
        self.script.lock().unwrap().push_back(reply);
    }

    /// Append a successful content reply to the script.
    pub fn push_content(&self, content: impl Into<String>) {
        self.push(MockReply::Content(content.into()));
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// All requests observed so far, in call order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn unit_usage() -> TokenUsage {
        TokenUsage { prompt_tokens: 1, completion_tokens: 1, total_tokens: 2 }
    }
}

impl ChatModel for MockChatModel {
    type Error = LlmError;

    fn complete(
        &self,
        request: &ChatRequest,
        _options: &ChatOptions,
    ) -> Result<ChatResponse, Self::Error> {
        self.requests.lock().unwrap().push(request.clone());

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(MockReply::Content(content)) => Ok(ChatResponse {
                content: Some(content),
                usage: Some(Self::unit_usage()),
            }),
            Some(MockReply::Empty) => Ok(ChatResponse { content: None, usage: None }),
            Some(MockReply::RateLimited) => Err(LlmError::RateLimited),
            Some(MockReply::Error(message)) => Err(LlmError::Communication(message)),
            None => Ok(ChatResponse {
                content: Some(self.default_response.clone()),
                usage: Some(Self::unit_usage()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest { system: "sys".into(), user: "usr".into() }
    }

    #[test]
    fn test_mock_default_response() {
        let model = MockChatModel::new("fixed");
        let reply = model.complete(&request(), &ChatOptions::default()).unwrap();
        assert_eq!(reply.content.as_deref(), Some("fixed"));
        assert!(reply.usage.is_some());
    }

    #[test]
    fn test_mock_script_order() {
        let model = MockChatModel::new("default");
        model.push_content("one");
        model.push_content("two");

        let opts = ChatOptions::default();
        assert_eq!(model.complete(&request(), &opts).unwrap().content.as_deref(), Some("one"));
        assert_eq!(model.complete(&request(), &opts).unwrap().content.as_deref(), Some("two"));
        assert_eq!(
            model.complete(&request(), &opts).unwrap().content.as_deref(),
            Some("default")
        );
    }

    #[test]
    fn test_mock_scripted_errors() {
        let model = MockChatModel::new("default");
        model.push(MockReply::RateLimited);
        model.push(MockReply::Error("boom".into()));

        let opts = ChatOptions::default();
        assert!(matches!(
            model.complete(&request(), &opts),
            Err(LlmError::RateLimited)
        ));
        assert!(matches!(
            model.complete(&request(), &opts),
            Err(LlmError::Communication(_))
        ));
    }

    #[test]
    fn test_mock_records_requests() {
        let model = MockChatModel::new("ok");
        model.complete(&request(), &ChatOptions::default()).unwrap();

        let seen = model.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system, "sys");
        assert_eq!(seen[0].user, "usr");
    }

    #[test]
    fn test_mock_clone_shares_state() {
        let a = MockChatModel::new("ok");
        let b = a.clone();
        a.complete(&request(), &ChatOptions::default()).unwrap();
        assert_eq!(b.call_count(), 1);
    }

    #[test]
    fn test_rate_limit_is_the_only_retryable_class() {
        assert!(LlmError::RateLimited.is_retryable());
        assert!(!LlmError::Communication("x".into()).is_retryable());
        assert!(!LlmError::EmptyReply.is_retryable());
        assert!(!LlmError::InvalidResponse("x".into()).is_retryable());
    }
}
