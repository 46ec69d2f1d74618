//! HTTP clients for the supported LLM providers.

pub mod gemini;
pub mod openrouter;

pub use gemini::{GeminiBackend, GeminiConfig};
pub use openrouter::{OpenRouterBackend, OpenRouterConfig};

use crate::error::ProviderFailure;
use std::time::Duration;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Longest slice of an error body kept for logs.
const MAX_ERROR_BODY: usize = 512;

fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderFailure> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderFailure::InvalidConfig {
            reason: e.to_string(),
        })
}

/// Maps a transport-level reqwest error onto a failure cause.
fn classify(err: &reqwest::Error) -> ProviderFailure {
    if err.is_timeout() {
        ProviderFailure::Timeout
    } else if err.is_decode() {
        ProviderFailure::ResponseParseFailed {
            reason: err.to_string(),
        }
    } else {
        ProviderFailure::RequestFailed {
            reason: err.to_string(),
        }
    }
}

/// Turns a non-2xx response into a failure, keeping the start of the body.
async fn status_failure(response: reqwest::Response) -> ProviderFailure {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ProviderFailure::HttpStatus {
        status,
        body: body.chars().take(MAX_ERROR_BODY).collect(),
    }
}
