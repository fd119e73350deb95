//! Language model routes.

use super::{ApiJson, ApiResult, ok};
use crate::state::AppState;
use axum::extract::State;
use rehearse_core::RehearseError;
use rehearse_types::InterviewType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
pub struct LlmStatusResponse {
    pub model: String,
    pub available: bool,
}

/// Probe the model with a short prompt, bounded by the status timeout.
pub async fn status(State(state): State<Arc<AppState>>) -> ApiResult<LlmStatusResponse> {
    let gateway = state.manager()?.gateway();
    let available = gateway.check_status().await;
    ok(LlmStatusResponse {
        model: gateway.model().to_string(),
        available,
    })
}

#[derive(Deserialize)]
pub struct QuestionRequest {
    #[serde(rename = "type", alias = "interview_type")]
    pub interview_type: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
}

fn default_difficulty() -> String {
    "medium".to_string()
}

#[derive(Serialize)]
pub struct QuestionResponse {
    pub question: String,
    pub interview_type: InterviewType,
    pub difficulty: String,
}

pub async fn question(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<QuestionRequest>,
) -> ApiResult<QuestionResponse> {
    let manager = state.manager()?;
    let interview_type: InterviewType = req
        .interview_type
        .parse()
        .map_err(RehearseError::InvalidInterviewType)?;
    let question = manager
        .gateway()
        .generate_question(interview_type, &req.difficulty)
        .await;
    ok(QuestionResponse {
        question,
        interview_type,
        difficulty: req.difficulty,
    })
}
