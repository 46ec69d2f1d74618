//! Shared application state.

use crate::cache::ResponseCache;
use crate::config::{AppEnv, ConfigError, ServerConfig};
use paper_lantern_ai::providers::{
    GeminiBackend, GeminiConfig, OpenRouterBackend, OpenRouterConfig,
};
use paper_lantern_ai::{
    FallbackChain, GenerationError, GenerationRequest, GenerationResult, LlmBackend, LlmProvider,
    PromptKind, RetryPolicy,
};
use paper_lantern_core::Result;
use paper_lantern_render::Renderer;
use std::sync::Arc;
use tracing::{debug, info};

/// State shared by every request handler.
#[derive(Debug)]
pub struct AppState {
    chain: FallbackChain,
    renderer: Renderer,
    cache: Option<ResponseCache>,
    environment: AppEnv,
}

impl AppState {
    /// Assembles state from already-built parts.
    #[must_use]
    pub fn new(chain: FallbackChain, renderer: Renderer, environment: AppEnv) -> Self {
        Self {
            chain,
            renderer,
            cache: None,
            environment,
        }
    }

    /// Enables the response cache.
    #[must_use]
    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Builds provider clients, the fallback chain, the renderer and the
    /// cache from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider order is invalid, the primary
    /// provider has no key, a client cannot be built, or the watermark
    /// cannot be rendered.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let mut backends: Vec<Arc<dyn LlmBackend>> = Vec::new();
        for provider in config.active_providers()? {
            let Some(key) = config.api_key(provider) else {
                continue;
            };
            backends.push(build_backend(config, provider, key)?);
        }

        let retry = RetryPolicy::new(config.providers.retries, config.providers.retry_delay());
        let chain = FallbackChain::new(backends).with_retry_policy(retry);
        info!(
            providers = ?chain.providers().collect::<Vec<_>>(),
            retries = config.providers.retries,
            "provider chain ready"
        );

        let renderer = Renderer::new(&config.pdf.watermark).map_err(|e| ConfigError::Invalid {
            details: e.to_string(),
        })?;

        let state = Self::new(chain, renderer, config.app_env);
        if config.cache.enabled {
            Ok(state.with_cache(ResponseCache::new(
                config.cache.ttl_seconds,
                config.cache.capacity,
            )))
        } else {
            Ok(state)
        }
    }

    /// Generates text for `request`, consulting the cache first.
    ///
    /// # Errors
    ///
    /// Returns an error if every provider fails.
    pub async fn generate(
        &self,
        kind: PromptKind,
        request: &GenerationRequest,
    ) -> std::result::Result<GenerationResult, GenerationError> {
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(kind, request.prompt())
        {
            debug!(%kind, source = %hit.source, "cache hit");
            return Ok(hit);
        }

        let result = self.chain.generate(request).await?;
        if let Some(cache) = &self.cache {
            cache.insert(kind, request.prompt(), result.clone());
        }
        Ok(result)
    }

    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Whether error responses may include internal detail.
    #[must_use]
    pub fn expose_error_detail(&self) -> bool {
        self.environment != AppEnv::Production
    }

    /// Whether `provider` is part of the chain.
    #[must_use]
    pub fn has_provider(&self, provider: LlmProvider) -> bool {
        self.chain.providers().any(|p| p == provider)
    }

    /// Whether a secondary provider is available.
    #[must_use]
    pub fn has_fallback(&self) -> bool {
        self.chain.len() > 1
    }
}

fn build_backend(
    config: &ServerConfig,
    provider: LlmProvider,
    key: &str,
) -> Result<Arc<dyn LlmBackend>, ConfigError> {
    let settings = &config.providers;
    let invalid = |e: paper_lantern_ai::ProviderError| ConfigError::Invalid {
        details: e.to_string(),
    };

    let backend: Arc<dyn LlmBackend> = match provider {
        LlmProvider::Gemini => {
            let mut gemini = GeminiConfig::new(key).with_timeout(settings.timeout());
            if let Some(base_url) = &settings.gemini_base_url {
                gemini = gemini.with_base_url(base_url);
            }
            if let Some(model) = &settings.gemini_model {
                gemini = gemini.with_model(model);
            }
            Arc::new(GeminiBackend::new(gemini).map_err(invalid)?)
        }
        LlmProvider::OpenRouter => {
            let mut openrouter = OpenRouterConfig::new(key).with_timeout(settings.timeout());
            if let Some(base_url) = &settings.openrouter_base_url {
                openrouter = openrouter.with_base_url(base_url);
            }
            if let Some(model) = &settings.openrouter_model {
                openrouter = openrouter.with_model(model);
            }
            Arc::new(OpenRouterBackend::new(openrouter).map_err(invalid)?)
        }
    };
    Ok(backend)
}
