//! Text generation for paper-lantern.
//!
//! This crate turns a user topic into generated text:
//!
//! - **Prompt**: attaches the system context for each answer kind
//! - **Providers**: HTTP clients for Gemini and OpenRouter
//! - **Fallback**: tries providers in priority order until one answers

pub mod backend;
pub mod error;
pub mod fallback;
pub mod generation;
pub mod prompt;
pub mod providers;

pub use backend::{LlmBackend, LlmProvider, LlmResponse, TokenUsage};
pub use error::{GenerationError, ParseProviderError, PromptError, ProviderError, ProviderFailure};
pub use fallback::{FallbackChain, MAX_RETRIES, RetryPolicy};
pub use generation::{GenerationRequest, GenerationResult, ProviderRole};
pub use prompt::{AssignmentBrief, PromptKind, PromptTemplate, VariableDefinition};
