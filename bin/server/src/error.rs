//! HTTP-facing error type.
//!
//! Handlers return `ApiError`; it maps each failure class to a status code
//! and a JSON body of the form `{"error": "..."}`. Internal detail is added
//! as `"detail"` only when the server is not running in production.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use paper_lantern_ai::{GenerationError, PromptError};
use paper_lantern_render::RenderError;
use serde::Serialize;
use std::fmt;
use tracing::error;

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// The request body was malformed or missing a required field.
    Validation { message: String },
    /// Every configured provider failed.
    Generation(GenerationError),
    /// The generated text could not be turned into a PDF.
    Render(RenderError),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation { message } => write!(f, "invalid request: {message}"),
            Self::Generation(err) => write!(f, "generation failed: {err}"),
            Self::Render(err) => write!(f, "pdf rendering failed: {err}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<PromptError> for ApiError {
    fn from(err: PromptError) -> Self {
        let message = match err {
            PromptError::EmptyPrompt => "Prompt is required".to_string(),
            other => other.to_string(),
        };
        Self::Validation { message }
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        Self::Generation(err)
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        Self::Render(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ApiError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Generation(_) | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the response, including internal detail when `expose_detail`.
    #[must_use]
    pub fn into_response_with_detail(self, expose_detail: bool) -> Response {
        let status = self.status();
        let (message, detail) = match &self {
            Self::Validation { message } => (message.clone(), None),
            Self::Generation(err) => {
                error!(error = %err, "generation failed");
                (
                    "Failed to generate content. Please try again later.".to_string(),
                    Some(err.to_string()),
                )
            }
            Self::Render(err) => {
                error!(error = %err, "pdf rendering failed");
                ("Failed to generate PDF.".to_string(), Some(err.to_string()))
            }
        };

        let body = ErrorBody {
            error: message,
            detail: detail.filter(|_| expose_detail),
        };
        (status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_with_detail(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paper_lantern_ai::{LlmProvider, ProviderError, ProviderFailure};
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn all_failed() -> ApiError {
        ApiError::Generation(GenerationError::AllProvidersFailed {
            attempts: 2,
            last: ProviderError::new(LlmProvider::Gemini, ProviderFailure::Timeout),
        })
    }

    #[tokio::test]
    async fn validation_maps_to_bad_request() {
        let response = ApiError::from(PromptError::EmptyPrompt).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Prompt is required");
    }

    #[tokio::test]
    async fn detail_is_hidden_unless_requested() {
        let hidden = body_json(all_failed().into_response_with_detail(false)).await;
        assert!(hidden.get("detail").is_none());

        let response = all_failed().into_response_with_detail(true);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let shown = body_json(response).await;
        assert!(
            shown["detail"]
                .as_str()
                .is_some_and(|detail| detail.contains("timed out"))
        );
    }

    #[test]
    fn render_errors_are_server_errors() {
        assert_eq!(
            ApiError::from(RenderError::EmptyInput).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
