//! Interview session types and state machine states.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{CodeAnalysis, CodeValidationResult};

/// Kind of interview being simulated. Fixed at session creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    Technical,
    Behavioral,
    SystemDesign,
}

impl InterviewType {
    pub const ALL: [InterviewType; 3] = [
        InterviewType::Technical,
        InterviewType::Behavioral,
        InterviewType::SystemDesign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Technical => "technical",
            InterviewType::Behavioral => "behavioral",
            InterviewType::SystemDesign => "system_design",
        }
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Ok(InterviewType::Technical),
            "behavioral" => Ok(InterviewType::Behavioral),
            "system_design" => Ok(InterviewType::SystemDesign),
            other => Err(format!(
                "Invalid interview type: '{}'. Use 'technical', 'behavioral' or 'system_design'.",
                other
            )),
        }
    }
}

/// Position of a session in the interview state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewState {
    /// Created, not started.
    Init,
    /// Self-introduction phase.
    Introduction,
    /// Main questioning phase.
    Questioning,
    /// Entered on every code submission; left again on the next answer.
    CodeReview,
    /// Wrap-up questions.
    Evaluation,
    /// Terminal. The session lives in completed storage.
    Completed,
    /// Terminal. Reserved; nothing currently drives a session here.
    Failed,
}

impl InterviewState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, InterviewState::Completed | InterviewState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewState::Init => "init",
            InterviewState::Introduction => "introduction",
            InterviewState::Questioning => "questioning",
            InterviewState::CodeReview => "code_review",
            InterviewState::Evaluation => "evaluation",
            InterviewState::Completed => "completed",
            InterviewState::Failed => "failed",
        }
    }
}

impl fmt::Display for InterviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Interviewer,
    Candidate,
}

impl Role {
    /// Speaker label used when a transcript is replayed to the model.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Interviewer => "Interviewer",
            Role::Candidate => "Candidate",
        }
    }
}

/// Extra data attached to a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnMetadata {
    CodeSubmission {
        language: String,
        analysis: CodeAnalysis,
        validation: CodeValidationResult,
    },
}

/// One message in a session's conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// State the session was in when the turn was recorded.
    pub state: InterviewState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TurnMetadata>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>, state: InterviewState) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            state,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: TurnMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// `"Candidate: ..."` form used in model context.
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.role.label(), self.content)
    }
}

/// Performance metrics (scores are 0-100).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewMetrics {
    pub technical_score: u8,
    pub communication_score: u8,
    pub problem_solving_score: u8,
    pub overall_score: u8,
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Letter grade.
    pub response_quality: String,
}

impl Default for InterviewMetrics {
    fn default() -> Self {
        Self {
            technical_score: 0,
            communication_score: 0,
            problem_solving_score: 0,
            overall_score: 0,
            total_questions: 0,
            correct_answers: 0,
            response_quality: "B".to_string(),
        }
    }
}

/// Full state of one interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSession {
    pub session_id: Uuid,
    pub interview_type: InterviewType,
    pub state: InterviewState,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Append-only; replayed to the model as context.
    pub conversation_history: Vec<Turn>,
    pub current_question: String,
    pub question_count: u32,
    pub metrics: InterviewMetrics,
    pub feedback_history: Vec<String>,
    pub candidate_name: String,
    pub position: String,
    pub difficulty_level: String,
}

impl InterviewSession {
    pub fn new(
        interview_type: InterviewType,
        candidate_name: impl Into<String>,
        position: impl Into<String>,
        difficulty_level: impl Into<String>,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            interview_type,
            state: InterviewState::Init,
            start_time: Utc::now(),
            end_time: None,
            conversation_history: Vec::new(),
            current_question: String::new(),
            question_count: 0,
            metrics: InterviewMetrics::default(),
            feedback_history: Vec::new(),
            candidate_name: candidate_name.into(),
            position: position.into(),
            difficulty_level: difficulty_level.into(),
        }
    }

    /// Minutes between start and `now` (or `end_time` once completed).
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> f64 {
        let end = self.end_time.unwrap_or(now);
        (end - self.start_time).num_milliseconds() as f64 / 60_000.0
    }

    pub fn record(&mut self, turn: Turn) {
        self.conversation_history.push(turn);
    }
}
