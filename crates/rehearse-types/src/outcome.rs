//! Payloads returned by session operations.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{CodeAnalysis, CodeValidationResult, InterviewMetrics, InterviewState, InterviewType};

/// Result of starting an interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartedInterview {
    pub session_id: Uuid,
    pub question: String,
    pub state: InterviewState,
    pub interview_type: InterviewType,
    pub question_number: u32,
    pub max_questions: u32,
    pub time_limit_minutes: u32,
}

/// Feedback on an answer plus the next question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub session_id: Uuid,
    pub feedback: String,
    pub next_question: String,
    pub state: InterviewState,
    pub question_number: u32,
    pub progress_percentage: u8,
}

/// What processing an answer produced: either the next turn or the end of the interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnswerOutcome {
    Continue(AnswerFeedback),
    Ended(EndSummary),
}

impl AnswerOutcome {
    pub fn is_ended(&self) -> bool {
        matches!(self, AnswerOutcome::Ended(_))
    }
}

/// Result of a code submission during an interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeReview {
    pub session_id: Uuid,
    pub analysis: CodeAnalysis,
    pub validation: CodeValidationResult,
    pub follow_up_question: String,
    pub state: InterviewState,
}

/// Final report of a completed interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndSummary {
    pub session_id: Uuid,
    pub summary: String,
    pub final_score: u8,
    /// Grade from the score thresholds.
    pub grade: String,
    /// Grade the model assigned in its summary text.
    pub llm_grade: String,
    pub duration_minutes: f64,
    pub total_questions: u32,
    pub metrics: InterviewMetrics,
    pub recommendations: Vec<String>,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub state: InterviewState,
    pub interview_type: InterviewType,
    pub candidate_name: String,
    pub position: String,
    pub difficulty_level: String,
    pub duration_minutes: f64,
    pub question_count: u32,
    pub max_questions: u32,
    pub progress_percentage: u8,
    pub current_metrics: InterviewMetrics,
    pub is_active: bool,
}
