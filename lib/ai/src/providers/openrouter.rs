//! OpenRouter chat completions client.

use super::{DEFAULT_TIMEOUT, classify, http_client, status_failure};
use crate::backend::{LlmBackend, LlmProvider, LlmResponse, TokenUsage};
use crate::error::{ProviderError, ProviderFailure};
use crate::generation::GenerationRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Public OpenRouter API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1-0528-qwen3-8b:free";

/// Configuration for the OpenRouter backend.
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Bearer token.
    pub api_key: String,
    /// Base URL including the `/api/v1` path.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Sent as `HTTP-Referer` for OpenRouter attribution.
    pub referer: String,
    /// Sent as `X-Title` for OpenRouter attribution.
    pub title: String,
}

impl OpenRouterConfig {
    /// Creates a configuration with the public endpoint and default model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            referer: "https://github.com/Technosorcery/paper-lantern".to_string(),
            title: "Paper Lantern".to_string(),
        }
    }

    /// Overrides the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// OpenRouter backend.
#[derive(Debug, Clone)]
pub struct OpenRouterBackend {
    config: OpenRouterConfig,
    client: reqwest::Client,
}

impl OpenRouterBackend {
    /// Creates a backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: OpenRouterConfig) -> Result<Self, ProviderError> {
        let client = http_client(config.timeout)
            .map_err(|cause| ProviderError::new(LlmProvider::OpenRouter, cause))?;
        Ok(Self { config, client })
    }

    fn fail(&self, cause: ProviderFailure) -> ProviderError {
        ProviderError::new(LlmProvider::OpenRouter, cause)
    }
}

#[async_trait]
impl LlmBackend for OpenRouterBackend {
    #[instrument(skip_all, fields(provider = "openrouter", model = %self.config.model))]
    async fn generate(&self, request: &GenerationRequest) -> Result<LlmResponse, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if !request.context().is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: request.context(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt(),
        });

        let body = ChatRequest {
            model: &self.config.model,
            messages,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.fail(classify(&e)))?;

        if !response.status().is_success() {
            return Err(self.fail(status_failure(response).await));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.fail(classify(&e)))?;

        let choice = payload.choices.into_iter().next().ok_or_else(|| {
            self.fail(ProviderFailure::ResponseParseFailed {
                reason: "no choices returned".to_string(),
            })
        })?;

        let content = choice
            .message
            .and_then(|message| message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(self.fail(ProviderFailure::EmptyResponse));
        }

        let usage = payload
            .usage
            .map(|usage| TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            })
            .unwrap_or_default();
        debug!(total_tokens = usage.total(), "openrouter response received");

        Ok(LlmResponse {
            content,
            model: self.config.model.clone(),
            usage,
        })
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::OpenRouter
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
