//! Route handlers.
//!
//! Every POST handler validates its body before touching a provider, so a
//! bad request never costs an upstream call.

use crate::error::ApiError;
use crate::extract::AppJson;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use paper_lantern_ai::prompt::{self, AssignmentBrief, PromptKind};
use paper_lantern_ai::{LlmProvider, PromptError};
use paper_lantern_core::RequestId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

pub type SharedState = Arc<AppState>;

/// Body of `POST /generate-assignment`.
///
/// Either `prompt` or the structured `subject`/`topic`/`level` brief.
#[derive(Debug, Default, Deserialize)]
pub struct AssignmentBody {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

/// Body of the long- and short-answer endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PromptBody {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Body of `POST /download-pdf`.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadBody {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// `?download=pdf` switches a generation endpoint to PDF output.
#[derive(Debug, Default, Deserialize)]
pub struct OutputQuery {
    #[serde(default)]
    pub download: Option<String>,
}

impl OutputQuery {
    fn wants_pdf(&self) -> bool {
        self.download
            .as_deref()
            .is_some_and(|format| format.eq_ignore_ascii_case("pdf"))
    }
}

/// JSON response of the generation endpoints.
#[derive(Debug, Serialize)]
pub struct GenerationBody {
    pub text: String,
    pub source: LlmProvider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub providers: ProviderStatus,
    pub fallback: bool,
}

/// Whether each provider is configured.
#[derive(Debug, Serialize)]
pub struct ProviderStatus {
    pub gemini: bool,
    pub openrouter: bool,
}

#[instrument(skip_all, fields(request_id = %RequestId::new()))]
pub async fn generate_assignment(
    State(state): State<SharedState>,
    Query(query): Query<OutputQuery>,
    AppJson(body): AppJson<AssignmentBody>,
) -> Response {
    respond(&state, assignment(&state, &query, body).await)
}

#[instrument(skip_all, fields(request_id = %RequestId::new()))]
pub async fn generate_long_answer(
    State(state): State<SharedState>,
    Query(query): Query<OutputQuery>,
    AppJson(body): AppJson<PromptBody>,
) -> Response {
    respond(&state, long_answer(&state, &query, body).await)
}

#[instrument(skip_all, fields(request_id = %RequestId::new()))]
pub async fn generate_short_answer(
    State(state): State<SharedState>,
    AppJson(body): AppJson<PromptBody>,
) -> Response {
    respond(&state, short_answer(&state, body).await)
}

#[instrument(skip_all, fields(request_id = %RequestId::new()))]
pub async fn download_pdf(
    State(state): State<SharedState>,
    AppJson(body): AppJson<DownloadBody>,
) -> Response {
    let result = match non_blank(body.content) {
        Some(content) => pdf_response(
            &state,
            &content,
            &download_filename(body.filename.as_deref()),
        ),
        None => Err(ApiError::validation("Content is required")),
    };
    respond(&state, result)
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        providers: ProviderStatus {
            gemini: state.has_provider(LlmProvider::Gemini),
            openrouter: state.has_provider(LlmProvider::OpenRouter),
        },
        fallback: state.has_fallback(),
    })
}

async fn assignment(
    state: &AppState,
    query: &OutputQuery,
    body: AssignmentBody,
) -> Result<Response, ApiError> {
    let has_brief = body.subject.is_some() || body.topic.is_some() || body.level.is_some();
    let (request, brief) = match non_blank(body.prompt) {
        Some(topic) => (prompt::build(PromptKind::Assignment, &topic)?, None),
        None if has_brief => {
            let brief = AssignmentBrief {
                subject: body.subject.unwrap_or_default(),
                topic: body.topic.unwrap_or_default(),
                level: body.level.unwrap_or_default(),
            };
            (prompt::build_brief(&brief)?, Some(brief))
        }
        None => return Err(PromptError::EmptyPrompt.into()),
    };

    let result = state.generate(PromptKind::Assignment, &request).await?;

    if query.wants_pdf() {
        let subject = brief.as_ref().map(|brief| brief.subject.as_str());
        let filename = assignment_filename(subject, Utc::now().timestamp_millis());
        return pdf_response(state, &result.text, &filename);
    }

    let (subject, topic) = match brief {
        Some(brief) => (Some(brief.subject), Some(brief.topic)),
        None => (None, None),
    };
    Ok(Json(GenerationBody {
        text: result.text,
        source: result.source,
        subject,
        topic,
    })
    .into_response())
}

async fn long_answer(
    state: &AppState,
    query: &OutputQuery,
    body: PromptBody,
) -> Result<Response, ApiError> {
    let topic = non_blank(body.prompt).ok_or(PromptError::EmptyPrompt)?;
    let request = prompt::build(PromptKind::LongAnswer, &topic)?;
    let result = state.generate(PromptKind::LongAnswer, &request).await?;

    if query.wants_pdf() {
        let filename = long_answer_filename(Utc::now().timestamp_millis());
        return pdf_response(state, &result.text, &filename);
    }
    Ok(Json(GenerationBody {
        text: result.text,
        source: result.source,
        subject: None,
        topic: None,
    })
    .into_response())
}

async fn short_answer(state: &AppState, body: PromptBody) -> Result<Response, ApiError> {
    let topic = non_blank(body.prompt).ok_or(PromptError::EmptyPrompt)?;
    let request = prompt::build(PromptKind::ShortAnswer, &topic)?;
    let result = state.generate(PromptKind::ShortAnswer, &request).await?;
    Ok(Json(GenerationBody {
        text: result.text,
        source: result.source,
        subject: None,
        topic: None,
    })
    .into_response())
}

fn respond(state: &AppState, result: Result<Response, ApiError>) -> Response {
    result.unwrap_or_else(|err| err.into_response_with_detail(state.expose_error_detail()))
}

fn pdf_response(state: &AppState, text: &str, filename: &str) -> Result<Response, ApiError> {
    let document = state.renderer().render(text)?;
    info!(pages = document.page_count, filename, "serving pdf");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        document.bytes,
    )
        .into_response())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Keeps only `[A-Za-z0-9_-]`.
fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect()
}

fn assignment_filename(subject: Option<&str>, millis: i64) -> String {
    match subject.map(sanitize).filter(|subject| !subject.is_empty()) {
        Some(subject) => format!("assignment-{subject}-{millis}.pdf"),
        None => format!("assignment-{millis}.pdf"),
    }
}

fn long_answer_filename(millis: i64) -> String {
    format!("long-answer-{millis}.pdf")
}

fn download_filename(requested: Option<&str>) -> String {
    let stem = requested
        .map(|name| {
            let name = name.trim();
            name.len()
                .checked_sub(4)
                .and_then(|split| name.get(split..).map(|ext| (split, ext)))
                .filter(|(_, ext)| ext.eq_ignore_ascii_case(".pdf"))
                .map_or(name, |(split, _)| &name[..split])
        })
        .map(sanitize)
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "output".to_string());
    format!("{stem}.pdf")
}
