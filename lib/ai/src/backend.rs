//! LLM backend abstraction.
//!
//! Every provider is reached through the same `LlmBackend` trait so the
//! fallback chain can iterate over them without knowing which is which.

use crate::error::{ParseProviderError, ProviderError};
use crate::generation::GenerationRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API.
    Gemini,
    /// OpenRouter chat completions API.
    OpenRouter,
}

impl LlmProvider {
    /// All known providers.
    pub const ALL: [LlmProvider; 2] = [LlmProvider::Gemini, LlmProvider::OpenRouter];

    /// Returns the wire/config identifier.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = ParseProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openrouter" => Ok(Self::OpenRouter),
            _ => Err(ParseProviderError {
                name: s.to_string(),
            }),
        }
    }
}

/// A response from an LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated content.
    pub content: String,
    /// Model that generated the response.
    pub model: String,
    /// Token usage statistics, when the provider reports them.
    pub usage: TokenUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Returns the total number of tokens.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Trait for LLM backends.
///
/// One call is one network request. Implementations never retry; that is
/// the fallback chain's job.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generates text for the given request.
    ///
    /// # Errors
    ///
    /// Returns a `ProviderError` on network failure, timeout, non-2xx
    /// status, an unparseable payload, or an empty generated text.
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse, ProviderError>;

    /// Returns the provider type.
    fn provider(&self) -> LlmProvider;

    /// Returns the model name.
    fn model(&self) -> &str;
}
