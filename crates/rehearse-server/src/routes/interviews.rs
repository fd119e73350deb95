//! Interview session routes.

use super::{ApiJson, ApiPath, ApiResult, ok};
use crate::state::AppState;
use axum::extract::State;
use rehearse_core::TypeLimits;
use rehearse_types::{
    AnswerOutcome, CodeReview, EndSummary, InterviewType, SessionSnapshot, StartedInterview,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct CreateInterviewRequest {
    #[serde(rename = "type", alias = "interview_type", default = "default_type")]
    pub interview_type: String,
    #[serde(default)]
    pub candidate_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

fn default_type() -> String {
    InterviewType::Technical.as_str().to_string()
}

/// Create a session and ask the opening question.
pub async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateInterviewRequest>,
) -> ApiResult<StartedInterview> {
    let manager = state.manager()?;
    let session_id = manager
        .create_session(
            &req.interview_type,
            req.candidate_name.as_deref().unwrap_or_default(),
            req.position.as_deref().unwrap_or_default(),
            req.difficulty.as_deref().unwrap_or_default(),
        )
        .await?;
    let started = manager.start(session_id).await?;
    info!(
        target: "rehearse::api",
        "Interview {} started ({})", session_id, started.interview_type
    );
    ok(started)
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<SessionSnapshot> {
    let snapshot = state.manager()?.status(id).await?;
    ok(snapshot)
}

#[derive(Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub answer: String,
}

pub async fn answer(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<AnswerRequest>,
) -> ApiResult<AnswerOutcome> {
    let outcome = state.manager()?.process_answer(id, &req.answer).await?;
    if outcome.is_ended() {
        info!(target: "rehearse::api", "Interview {} reached its limits", id);
    }
    ok(outcome)
}

#[derive(Deserialize)]
pub struct SubmitCodeRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "python".to_string()
}

pub async fn submit_code(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<SubmitCodeRequest>,
) -> ApiResult<CodeReview> {
    let review = state
        .manager()?
        .submit_code(id, &req.code, &req.language)
        .await?;
    ok(review)
}

pub async fn end(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<EndSummary> {
    let summary = state.manager()?.end(id).await?;
    info!(
        target: "rehearse::api",
        "Interview {} ended with {} ({})", id, summary.final_score, summary.grade
    );
    ok(summary)
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub active_sessions: usize,
    pub completed_sessions: usize,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<StatsResponse> {
    let manager = state.manager()?;
    ok(StatsResponse {
        active_sessions: manager.active_count().await,
        completed_sessions: manager.completed_count().await,
    })
}

#[derive(Serialize)]
pub struct InterviewTypeInfo {
    pub id: InterviewType,
    pub name: &'static str,
    pub description: &'static str,
    pub max_questions: u32,
    pub time_limit_minutes: u32,
}

#[derive(Serialize)]
pub struct InterviewTypesResponse {
    pub types: Vec<InterviewTypeInfo>,
}

fn describe(interview_type: InterviewType) -> (&'static str, &'static str) {
    match interview_type {
        InterviewType::Technical => ("技術面試", "評估程式設計能力和技術知識"),
        InterviewType::Behavioral => ("行為面試", "評估軟技能和文化契合度"),
        InterviewType::SystemDesign => ("系統設計", "評估系統架構和設計能力"),
    }
}

/// Interview types with the configured limits. Available without an API key.
pub async fn types(State(state): State<Arc<AppState>>) -> ApiResult<InterviewTypesResponse> {
    let types = InterviewType::ALL
        .into_iter()
        .map(|interview_type| {
            let (name, description) = describe(interview_type);
            let TypeLimits {
                max_questions,
                time_limit_minutes,
            } = state.config.interview.limits(interview_type);
            InterviewTypeInfo {
                id: interview_type,
                name,
                description,
                max_questions,
                time_limit_minutes,
            }
        })
        .collect();
    ok(InterviewTypesResponse { types })
}
