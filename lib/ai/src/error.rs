//! Error types for the AI crate.
//!
//! - `PromptError`: building a generation request from user input
//! - `ProviderError`: one failed call against one provider
//! - `GenerationError`: the fallback chain gave up
//!
//! Provider failures are recovered inside the fallback chain; only
//! `GenerationError` is meant to leave this crate on the request path.

use crate::backend::LlmProvider;
use std::fmt;

/// Errors from prompt construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    /// The user prompt was missing or blank.
    EmptyPrompt,
    /// A required template variable was missing or blank.
    MissingVariable { template: String, variable: String },
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPrompt => write!(f, "prompt is required"),
            Self::MissingVariable { template, variable } => {
                write!(
                    f,
                    "missing required variable '{variable}' in template '{template}'"
                )
            }
        }
    }
}

impl std::error::Error for PromptError {}

/// Why a single provider call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// The request never produced an HTTP response.
    RequestFailed { reason: String },
    /// The call exceeded the configured timeout.
    Timeout,
    /// The provider answered with a non-2xx status.
    HttpStatus { status: u16, body: String },
    /// The response body was not the expected shape.
    ResponseParseFailed { reason: String },
    /// The response parsed but carried no generated text.
    EmptyResponse,
    /// The client could not be constructed.
    InvalidConfig { reason: String },
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => write!(f, "request failed: {reason}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::HttpStatus { status, body } => {
                if body.is_empty() {
                    write!(f, "HTTP {status}")
                } else {
                    write!(f, "HTTP {status}: {body}")
                }
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse response: {reason}")
            }
            Self::EmptyResponse => write!(f, "response contained no generated text"),
            Self::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
        }
    }
}

/// A failed call against a single provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// The provider that failed.
    pub provider: LlmProvider,
    /// What went wrong.
    pub cause: ProviderFailure,
}

impl ProviderError {
    /// Creates a provider error.
    #[must_use]
    pub fn new(provider: LlmProvider, cause: ProviderFailure) -> Self {
        Self { provider, cause }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "provider '{}' failed: {}", self.provider, self.cause)
    }
}

impl std::error::Error for ProviderError {}

/// Terminal errors from the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The chain was built without any provider.
    NoProviders,
    /// Every provider was tried and every attempt failed.
    AllProvidersFailed {
        /// Total attempts made across all providers.
        attempts: u32,
        /// The last failure observed.
        last: ProviderError,
    },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProviders => write!(f, "no AI providers are configured"),
            Self::AllProvidersFailed { attempts, last } => {
                write!(
                    f,
                    "all AI providers failed after {attempts} attempts; last: {last}"
                )
            }
        }
    }
}

impl std::error::Error for GenerationError {}

/// Returned when a provider name does not match a known provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseProviderError {
    /// The name that failed to parse.
    pub name: String,
}

impl fmt::Display for ParseProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown provider '{}'", self.name)
    }
}

impl std::error::Error for ParseProviderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_display() {
        let err = ProviderError::new(
            LlmProvider::Gemini,
            ProviderFailure::HttpStatus {
                status: 503,
                body: "overloaded".to_string(),
            },
        );
        let message = err.to_string();
        assert!(message.contains("gemini"));
        assert!(message.contains("503"));
        assert!(message.contains("overloaded"));
    }

    #[test]
    fn prompt_error_display() {
        let err = PromptError::MissingVariable {
            template: "assignment_brief".to_string(),
            variable: "level".to_string(),
        };
        assert!(err.to_string().contains("level"));
        assert!(err.to_string().contains("assignment_brief"));
    }

    #[test]
    fn generation_error_carries_last_cause() {
        let err = GenerationError::AllProvidersFailed {
            attempts: 2,
            last: ProviderError::new(LlmProvider::OpenRouter, ProviderFailure::Timeout),
        };
        let message = err.to_string();
        assert!(message.contains("2 attempts"));
        assert!(message.contains("openrouter"));
        assert!(message.contains("timed out"));
    }
}
