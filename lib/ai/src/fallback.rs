//! Ordered provider fallback.
//!
//! Providers are tried one after another in priority order. The first
//! non-empty answer wins and later providers are never called. Calls are
//! never issued concurrently: the order is the policy.

use crate::backend::{LlmBackend, LlmProvider};
use crate::error::{GenerationError, ProviderError, ProviderFailure};
use crate::generation::{GenerationRequest, GenerationResult, ProviderRole};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Upper bound on retries of a single provider.
pub const MAX_RETRIES: u32 = 3;

/// How often a provider is retried before moving on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// No retries: each provider gets exactly one attempt.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            retries: 0,
            delay: Duration::ZERO,
        }
    }

    /// Retries each provider `retries` extra times, waiting `delay` between
    /// attempts. `retries` is clamped to [`MAX_RETRIES`].
    #[must_use]
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self {
            retries: retries.min(MAX_RETRIES),
            delay,
        }
    }

    /// Attempts made against each provider.
    #[must_use]
    pub fn attempts_per_provider(&self) -> u32 {
        self.retries + 1
    }

    /// Delay between attempts against the same provider.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// An ordered list of providers with first-success-wins semantics.
#[derive(Clone)]
pub struct FallbackChain {
    backends: Vec<Arc<dyn LlmBackend>>,
    retry: RetryPolicy,
}

impl FallbackChain {
    /// Creates a chain; `backends[0]` is the primary.
    #[must_use]
    pub fn new(backends: Vec<Arc<dyn LlmBackend>>) -> Self {
        Self {
            backends,
            retry: RetryPolicy::none(),
        }
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Providers in priority order.
    pub fn providers(&self) -> impl Iterator<Item = LlmProvider> + '_ {
        self.backends.iter().map(|backend| backend.provider())
    }

    /// Returns the number of providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Returns whether the chain has no providers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Generates text, falling back through providers on failure.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::NoProviders` for an empty chain and
    /// `GenerationError::AllProvidersFailed` once every attempt against
    /// every provider has failed.
    #[instrument(skip_all, fields(providers = self.backends.len()))]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let mut attempts = 0u32;
        let mut last_error: Option<ProviderError> = None;

        for (index, backend) in self.backends.iter().enumerate() {
            let provider = backend.provider();

            for attempt in 1..=self.retry.attempts_per_provider() {
                if attempt > 1 && !self.retry.delay.is_zero() {
                    tokio::time::sleep(self.retry.delay).await;
                }
                attempts += 1;

                let outcome = match backend.generate(request).await {
                    Ok(response) if response.content.trim().is_empty() => {
                        Err(ProviderError::new(provider, ProviderFailure::EmptyResponse))
                    }
                    other => other,
                };

                match outcome {
                    Ok(response) => {
                        debug!(
                            %provider,
                            model = %response.model,
                            input_tokens = response.usage.input_tokens,
                            output_tokens = response.usage.output_tokens,
                            "provider answered"
                        );
                        return Ok(GenerationResult {
                            text: response.content,
                            source: provider,
                            role: ProviderRole::for_index(index),
                        });
                    }
                    Err(err) => {
                        warn!(
                            %provider,
                            model = backend.model(),
                            attempt,
                            error = %err.cause,
                            "provider call failed"
                        );
                        last_error = Some(err);
                    }
                }
            }

            if let Some(next) = self.backends.get(index + 1) {
                info!(from = %provider, to = %next.provider(), "falling back to next provider");
            }
        }

        match last_error {
            Some(last) => {
                error!(attempts, error = %last, "all providers failed");
                Err(GenerationError::AllProvidersFailed { attempts, last })
            }
            None => Err(GenerationError::NoProviders),
        }
    }
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("providers", &self.providers().collect::<Vec<_>>())
            .field("retry", &self.retry)
            .finish()
    }
}
