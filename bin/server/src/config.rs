//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables. Nested keys
//! use `__` as the separator, so `PROVIDERS__ORDER` sets `providers.order`.

use paper_lantern_ai::LlmProvider;
use paper_lantern_core::Result;
use serde::Deserialize;
use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::warn;

/// Configuration errors. All of them abort startup.
#[derive(Debug)]
pub enum ConfigError {
    /// The environment could not be read or deserialized.
    Load { details: String },
    /// `PROVIDERS__ORDER` named a provider that does not exist.
    UnknownProvider { name: String },
    /// `PROVIDERS__ORDER` was empty.
    NoProviders,
    /// The primary provider has no API key.
    MissingProviderKey {
        provider: LlmProvider,
        variable: &'static str,
    },
    /// A provider client or the renderer could not be built.
    Invalid { details: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { details } => write!(f, "failed to load configuration: {details}"),
            Self::UnknownProvider { name } => {
                write!(f, "unknown provider '{name}' in PROVIDERS__ORDER")
            }
            Self::NoProviders => write!(f, "PROVIDERS__ORDER does not name any provider"),
            Self::MissingProviderKey { provider, variable } => {
                write!(
                    f,
                    "primary provider '{provider}' requires {variable} to be set"
                )
            }
            Self::Invalid { details } => write!(f, "invalid configuration: {details}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Controls whether internal error detail reaches clients.
    #[serde(default)]
    pub app_env: AppEnv,

    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default)]
    pub openrouter_api_key: Option<String>,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub pdf: PdfConfig,

    /// Global cap on in-flight requests. Unlimited when unset; zero is
    /// rejected at load time.
    #[serde(default)]
    pub max_concurrent_requests: Option<NonZeroUsize>,
}

/// Provider ordering, timeouts and endpoint overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// Comma-separated priority order, primary first.
    #[serde(default = "default_order")]
    pub order: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Extra attempts per provider before falling back.
    #[serde(default)]
    pub retries: u32,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default)]
    pub gemini_base_url: Option<String>,

    #[serde(default)]
    pub gemini_model: Option<String>,

    #[serde(default)]
    pub openrouter_base_url: Option<String>,

    #[serde(default)]
    pub openrouter_model: Option<String>,
}

impl ProvidersConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
            timeout_seconds: default_timeout_seconds(),
            retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
            gemini_base_url: None,
            gemini_model: None,
            openrouter_base_url: None,
            openrouter_model: None,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    #[serde(default = "default_cache_ttl_seconds")]
    pub ttl_seconds: u64,

    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_seconds: default_cache_ttl_seconds(),
            capacity: default_cache_capacity(),
        }
    }
}

/// PDF output settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PdfConfig {
    #[serde(default = "default_watermark")]
    pub watermark: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            watermark: default_watermark(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_order() -> String {
    "openrouter,gemini".to_string()
}

fn default_timeout_seconds() -> u64 {
    15
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl_seconds() -> u64 {
    600
}

fn default_cache_capacity() -> usize {
    256
}

fn default_watermark() -> String {
    paper_lantern_render::DEFAULT_WATERMARK.to_string()
}

impl ServerConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(config::Environment::default())
    }

    /// Loads configuration from an explicit variable map instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed.
    pub fn from_vars(vars: config::Map<String, String>) -> Result<Self, ConfigError> {
        Self::load(config::Environment::default().source(Some(vars)))
    }

    fn load(source: config::Environment) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(source.separator("__").try_parsing(true))
            .build()
            .map_err(|e| ConfigError::Load {
                details: e.to_string(),
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::Load {
                details: e.to_string(),
            })?;
        Ok(config)
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        self.app_env == AppEnv::Production
    }

    /// The non-blank API key for `provider`, if any.
    #[must_use]
    pub fn api_key(&self, provider: LlmProvider) -> Option<&str> {
        let key = match provider {
            LlmProvider::Gemini => self.gemini_api_key.as_deref(),
            LlmProvider::OpenRouter => self.openrouter_api_key.as_deref(),
        };
        key.map(str::trim).filter(|key| !key.is_empty())
    }

    /// Parses `providers.order`, dropping duplicates.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider name or an empty list.
    pub fn provider_order(&self) -> Result<Vec<LlmProvider>, ConfigError> {
        let mut order = Vec::new();
        for name in self.providers.order.split(',').map(str::trim) {
            if name.is_empty() {
                continue;
            }
            let provider: LlmProvider = name.parse().map_err(|_| ConfigError::UnknownProvider {
                name: name.to_string(),
            })?;
            if !order.contains(&provider) {
                order.push(provider);
            }
        }
        if order.is_empty() {
            return Err(ConfigError::NoProviders.into());
        }
        Ok(order)
    }

    /// Providers that will be called, in order.
    ///
    /// The primary must have a key. Later providers without one are left
    /// out with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is invalid or the primary has no key.
    pub fn active_providers(&self) -> Result<Vec<LlmProvider>, ConfigError> {
        let order = self.provider_order()?;
        let mut active = Vec::with_capacity(order.len());
        for (index, provider) in order.into_iter().enumerate() {
            if self.api_key(provider).is_some() {
                active.push(provider);
            } else if index == 0 {
                return Err(ConfigError::MissingProviderKey {
                    provider,
                    variable: key_variable(provider),
                }
                .into());
            } else {
                warn!(
                    %provider,
                    variable = key_variable(provider),
                    "fallback provider has no API key; skipping it"
                );
            }
        }
        Ok(active)
    }
}

/// Environment variable holding the key for `provider`.
#[must_use]
pub fn key_variable(provider: LlmProvider) -> &'static str {
    match provider {
        LlmProvider::Gemini => "GEMINI_API_KEY",
        LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(vars: &[(&str, &str)]) -> ServerConfig {
        let vars = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::from_vars(vars).expect("config loads")
    }

    #[test]
    fn defaults_apply_with_empty_environment() {
        let config = load(&[]);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.providers.timeout(), Duration::from_secs(15));
        assert_eq!(config.providers.retries, 0);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_seconds, 600);
        assert_eq!(config.cache.capacity, 256);
        assert_eq!(config.pdf.watermark, "Paper Lantern");
        assert_eq!(config.max_concurrent_requests, None);
        assert_eq!(
            config.provider_order().expect("order"),
            vec![LlmProvider::OpenRouter, LlmProvider::Gemini]
        );
    }

    #[test]
    fn reads_flat_and_nested_variables() {
        let config = load(&[
            ("PORT", "8080"),
            ("APP_ENV", "production"),
            ("GEMINI_API_KEY", "g-key"),
            ("PROVIDERS__ORDER", "gemini"),
            ("PROVIDERS__RETRIES", "2"),
            ("PROVIDERS__GEMINI_MODEL", "gemini-2.0-flash"),
            ("CACHE__ENABLED", "false"),
            ("PDF__WATERMARK", "DRAFT"),
            ("MAX_CONCURRENT_REQUESTS", "16"),
        ]);
        assert_eq!(config.port, 8080);
        assert!(config.is_production());
        assert_eq!(config.api_key(LlmProvider::Gemini), Some("g-key"));
        assert_eq!(config.providers.retries, 2);
        assert_eq!(
            config.providers.gemini_model.as_deref(),
            Some("gemini-2.0-flash")
        );
        assert!(!config.cache.enabled);
        assert_eq!(config.pdf.watermark, "DRAFT");
        assert_eq!(config.max_concurrent_requests, NonZeroUsize::new(16));
    }

    #[test]
    fn invalid_port_fails_to_load() {
        let vars = [("PORT".to_string(), "not-a-port".to_string())]
            .into_iter()
            .collect();
        assert!(ServerConfig::from_vars(vars).is_err());
    }

    #[test]
    fn zero_concurrency_limit_fails_to_load() {
        let vars = [("MAX_CONCURRENT_REQUESTS".to_string(), "0".to_string())]
            .into_iter()
            .collect();
        assert!(ServerConfig::from_vars(vars).is_err());

        let config = load(&[("MAX_CONCURRENT_REQUESTS", "1")]);
        assert_eq!(config.max_concurrent_requests, NonZeroUsize::new(1));
    }

    #[test]
    fn missing_primary_key_fails_fast() {
        let config = load(&[("GEMINI_API_KEY", "g-key")]);
        let report = config.active_providers().unwrap_err();
        assert!(report.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = load(&[("OPENROUTER_API_KEY", "   ")]);
        assert_eq!(config.api_key(LlmProvider::OpenRouter), None);
        assert!(config.active_providers().is_err());
    }

    #[test]
    fn fallback_without_key_is_skipped() {
        let config = load(&[("OPENROUTER_API_KEY", "or-key")]);
        assert_eq!(
            config.active_providers().expect("primary configured"),
            vec![LlmProvider::OpenRouter]
        );
    }

    #[test]
    fn both_keys_keep_declared_order() {
        let config = load(&[
            ("OPENROUTER_API_KEY", "or-key"),
            ("GEMINI_API_KEY", "g-key"),
            ("PROVIDERS__ORDER", "gemini, openrouter, gemini"),
        ]);
        assert_eq!(
            config.active_providers().expect("valid"),
            vec![LlmProvider::Gemini, LlmProvider::OpenRouter]
        );
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = load(&[("PROVIDERS__ORDER", "openrouter,anthropic")]);
        assert!(config.provider_order().is_err());

        let empty = load(&[("PROVIDERS__ORDER", " , ")]);
        assert!(empty.provider_order().is_err());
    }
}
