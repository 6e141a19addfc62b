//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between the extraction core and
//! infrastructure. Implementations live in other crates (`trowel-llm`,
//! `trowel-store`, the CLI's page-source adapter).

use crate::page::ExtractedDocument;
use crate::token::TokenUsage;
use serde::{Deserialize, Serialize};

/// A chat request: one system message and one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    /// System/instruction message
    pub system: String,
    /// User message carrying the window payload
    pub user: String,
}

/// Sampling options for a chat call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    /// Model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Presence penalty
    pub presence_penalty: f64,
    /// Frequency penalty
    pub frequency_penalty: f64,
    /// Completion token cap, if any
    pub max_tokens: Option<u32>,
}

impl Default for ChatOptions {
    /// Deterministic extraction defaults: temperature 0, no penalties.
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            max_tokens: None,
        }
    }
}

/// A complete (non-streaming) chat reply.
#[derive(Debug, Clone, Default)]
pub struct ChatResponse {
    /// Reply text; `None`/empty is a hard failure for the call
    pub content: Option<String>,
    /// Token usage, when the provider reports it
    pub usage: Option<TokenUsage>,
}

/// The language-model collaborator.
///
/// Calls are blocking request/response; the core needs the complete reply
/// before it can parse and merge, so no streaming surface exists here.
pub trait ChatModel {
    /// Error type for model calls
    type Error;

    /// Execute one chat call and return the complete reply.
    fn complete(
        &self,
        request: &ChatRequest,
        options: &ChatOptions,
    ) -> Result<ChatResponse, Self::Error>;
}

/// The page/image extraction collaborator: turns a raw document into
/// positioned per-page text and image records.
pub trait PageSource {
    /// Error type for extraction
    type Error;

    /// Produce all positioned texts and images for the document at `path`.
    fn extract(&self, path: &str) -> Result<ExtractedDocument, Self::Error>;
}

/// One ranked glossary term entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// The term
    pub term: String,
    /// Its definition
    pub definition: String,
    /// Relevance score, higher is better
    pub score: f64,
}

/// The semantic glossary lookup collaborator.
///
/// Used only by ancillary chat functionality, never by extraction.
pub trait GlossarySearch {
    /// Error type for lookups
    type Error;

    /// Return up to `limit` semantically ranked entries for `query`.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<GlossaryEntry>, Self::Error>;
}
