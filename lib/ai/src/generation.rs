//! Request and result types for a single text generation.

use crate::backend::LlmProvider;
use crate::error::PromptError;
use serde::{Deserialize, Serialize};

/// A validated prompt plus the system context that shapes the answer.
///
/// Construction rejects a blank prompt, so every request that reaches a
/// provider carries something to answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    prompt: String,
    context: String,
}

impl GenerationRequest {
    /// Creates a request.
    ///
    /// # Errors
    ///
    /// Returns `PromptError::EmptyPrompt` if the prompt is empty or only
    /// whitespace.
    pub fn new(prompt: impl Into<String>, context: impl Into<String>) -> Result<Self, PromptError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(PromptError::EmptyPrompt);
        }
        Ok(Self {
            prompt,
            context: context.into(),
        })
    }

    /// The user prompt.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The system context.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Context and prompt joined for providers that take a single text part.
    #[must_use]
    pub fn combined(&self) -> String {
        if self.context.is_empty() {
            self.prompt.clone()
        } else {
            format!("{}\n\n{}", self.context, self.prompt)
        }
    }
}

/// Where in the fallback order a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderRole {
    /// The first provider in the chain.
    Primary,
    /// Any provider after the first.
    Secondary,
}

impl ProviderRole {
    /// Role for the provider at `index` in the chain.
    #[must_use]
    pub fn for_index(index: usize) -> Self {
        if index == 0 {
            Self::Primary
        } else {
            Self::Secondary
        }
    }
}

/// Generated text tagged with the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// The generated text; never empty.
    pub text: String,
    /// The provider that answered.
    pub source: LlmProvider,
    /// Position of that provider in the chain.
    pub role: ProviderRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_prompt_is_rejected() {
        assert_eq!(
            GenerationRequest::new("   \n", "ctx"),
            Err(PromptError::EmptyPrompt)
        );
    }

    #[test]
    fn prompt_is_kept_verbatim() {
        let request = GenerationRequest::new("  Photosynthesis ", "ctx").expect("valid");
        assert_eq!(request.prompt(), "  Photosynthesis ");
        assert_eq!(request.context(), "ctx");
    }

    #[test]
    fn combined_puts_context_first() {
        let request = GenerationRequest::new("question", "be brief").expect("valid");
        assert_eq!(request.combined(), "be brief\n\nquestion");

        let bare = GenerationRequest::new("question", "").expect("valid");
        assert_eq!(bare.combined(), "question");
    }

    #[test]
    fn role_for_index() {
        assert_eq!(ProviderRole::for_index(0), ProviderRole::Primary);
        assert_eq!(ProviderRole::for_index(1), ProviderRole::Secondary);
        assert_eq!(ProviderRole::for_index(4), ProviderRole::Secondary);
    }
}
