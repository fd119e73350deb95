//! Code validation, formatting and snippet routes.

use super::{ApiJson, ApiPath, ApiResult, ok};
use crate::state::AppState;
use axum::extract::State;
use rehearse_core::{RehearseError, StoreSnippetRequest, format_code};
use rehearse_types::{CodeLanguage, CodeSnippet, CodeValidationResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct CodeRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "python".to_string()
}

pub async fn validate(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CodeRequest>,
) -> ApiResult<CodeValidationResult> {
    let result = state.validator.validate(&req.code, &req.language).await;
    debug!(
        target: "rehearse::api",
        "Validated {} code: valid={} errors={}", req.language, result.is_valid, result.errors.len()
    );
    ok(result)
}

#[derive(Serialize)]
pub struct FormatResponse {
    pub formatted_code: String,
    pub language: String,
}

pub async fn format(ApiJson(req): ApiJson<CodeRequest>) -> ApiResult<FormatResponse> {
    let formatted_code = format_code(&req.code, &req.language);
    ok(FormatResponse {
        formatted_code,
        language: req.language,
    })
}

#[derive(Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<&'static str>,
}

pub async fn languages() -> ApiResult<LanguagesResponse> {
    ok(LanguagesResponse {
        languages: CodeLanguage::ALL.iter().map(CodeLanguage::as_str).collect(),
    })
}

#[derive(Deserialize)]
pub struct StoreSnippetBody {
    pub session_id: Uuid,
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub problem_description: String,
    #[serde(default)]
    pub is_solution: bool,
}

pub async fn store_snippet(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<StoreSnippetBody>,
) -> ApiResult<CodeSnippet> {
    if body.code.trim().is_empty() {
        return Err(RehearseError::Validation("Code cannot be empty".to_string()).into());
    }

    let snippet = state
        .snippets
        .store(StoreSnippetRequest {
            session_id: body.session_id,
            code: body.code,
            language: body.language,
            problem_description: body.problem_description,
            is_solution: body.is_solution,
        })
        .await;
    info!(
        target: "rehearse::api",
        "Stored snippet {} for session {}", snippet.snippet_id, snippet.session_id
    );
    ok(snippet)
}

pub async fn get_snippet(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<CodeSnippet> {
    let snippet = state
        .snippets
        .get(&id)
        .ok_or(RehearseError::SnippetNotFound(id))?;
    ok(snippet)
}

#[derive(Serialize)]
pub struct SessionSnippetsResponse {
    pub session_id: Uuid,
    pub count: usize,
    pub snippets: Vec<CodeSnippet>,
}

pub async fn list_session_snippets(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<SessionSnippetsResponse> {
    let snippets = state.snippets.list_for_session(id);
    ok(SessionSnippetsResponse {
        session_id: id,
        count: snippets.len(),
        snippets,
    })
}
