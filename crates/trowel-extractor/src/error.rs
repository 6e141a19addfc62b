//! Error types for the extraction core

use thiserror::Error;
use trowel_llm::LlmError;

/// Errors that can occur during report standardization
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The upstream extractor produced zero text fragments
    #[error("No text extracted: likely an image-only, non-text document")]
    NoText,

    /// Page/image extraction collaborator failure
    #[error("Page extraction failed: {0}")]
    PageSource(String),

    /// Language-model call failure
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Model reply was not parseable as the expected structured shape
    #[error("Malformed model reply: {0}")]
    MalformedReply(String),

    /// Retry budget exhausted for a model call
    #[error("Model call failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Attempts made before giving up
        attempts: u32,
        /// The error of the final attempt
        last: Box<ExtractError>,
    },

    /// Persistence sink failure
    #[error("Store error: {0}")]
    Store(String),

    /// Diagnostic dump or schema file I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request payload encoding failure
    #[error("JSON encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractError {
    /// Whether the bounded retry loop may re-attempt the operation.
    ///
    /// Rate-limit failures and malformed replies are retryable; transport
    /// and upstream-input failures are immediately fatal.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractError::Llm(e) => e.is_retryable(),
            ExtractError::MalformedReply(_) => true,
            _ => false,
        }
    }
}

impl From<trowel_store::StoreError> for ExtractError {
    fn from(e: trowel_store::StoreError) -> Self {
        ExtractError::Store(e.to_string())
    }
}
