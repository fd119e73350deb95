//! Interview session state machine.
//!
//! `InterviewManager` owns the session registry and drives every session
//! through `Init → Introduction → Questioning → Evaluation → Completed`,
//! with `CodeReview` entered whenever code is submitted. Each public
//! operation holds the session's lock for its whole duration, including the
//! model call, so operations on one session never interleave.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rehearse_types::{
    AnswerFeedback, AnswerOutcome, CodeReview, EndSummary, InterviewMetrics, InterviewSession,
    InterviewState, InterviewType, Role, SessionSnapshot, StartedInterview, Turn, TurnMetadata,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::llm::LlmGateway;
use crate::llm::extract::split_feedback_and_question;
use crate::registry::{SessionEntry, SessionRegistry};
use crate::validator::CodeValidator;
use crate::{RehearseError, Result};

/// Characters of analysis feedback quoted in the code follow-up question.
const FOLLOW_UP_EXCERPT: usize = 200;

/// Technical score assumed when no code was ever analysed.
const DEFAULT_TECHNICAL_SCORE: u8 = 70;

/// Question budget and time budget for one interview type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeLimits {
    pub max_questions: u32,
    pub time_limit_minutes: u32,
}

/// Limits and transition thresholds for every interview type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewPolicy {
    pub technical: TypeLimits,
    pub behavioral: TypeLimits,
    pub system_design: TypeLimits,
    /// `Introduction → Questioning` once this many questions were asked.
    pub questioning_after: u32,
    /// `Questioning → Evaluation` once this many questions were asked.
    pub evaluation_after: u32,
}

impl Default for InterviewPolicy {
    fn default() -> Self {
        Self {
            technical: TypeLimits {
                max_questions: 8,
                time_limit_minutes: 45,
            },
            behavioral: TypeLimits {
                max_questions: 6,
                time_limit_minutes: 30,
            },
            system_design: TypeLimits {
                max_questions: 4,
                time_limit_minutes: 60,
            },
            questioning_after: 2,
            evaluation_after: 6,
        }
    }
}

impl InterviewPolicy {
    pub fn limits(&self, interview_type: InterviewType) -> TypeLimits {
        match interview_type {
            InterviewType::Technical => self.technical,
            InterviewType::Behavioral => self.behavioral,
            InterviewType::SystemDesign => self.system_design,
        }
    }

    /// False once the question budget or time budget is spent, or the session failed.
    pub fn should_continue(&self, session: &InterviewSession, now: DateTime<Utc>) -> bool {
        let limits = self.limits(session.interview_type);
        if session.question_count >= limits.max_questions {
            return false;
        }
        if session.elapsed_minutes(now) >= f64::from(limits.time_limit_minutes) {
            return false;
        }
        session.state != InterviewState::Failed
    }

    pub fn progress(&self, session: &InterviewSession) -> u8 {
        let max = self.limits(session.interview_type).max_questions.max(1);
        (u64::from(session.question_count) * 100 / u64::from(max)).min(100) as u8
    }

    /// State after an answer was processed.
    fn next_state(&self, state: InterviewState, question_count: u32) -> InterviewState {
        match state {
            InterviewState::Introduction if question_count >= self.questioning_after => {
                InterviewState::Questioning
            }
            InterviewState::Questioning if question_count >= self.evaluation_after => {
                InterviewState::Evaluation
            }
            InterviewState::CodeReview if question_count >= self.evaluation_after => {
                InterviewState::Evaluation
            }
            InterviewState::CodeReview => InterviewState::Questioning,
            other => other,
        }
    }
}

/// Letter grade for an overall score.
pub fn grade_for(score: u8) -> &'static str {
    match score {
        90.. => "A+",
        85..=89 => "A",
        80..=84 => "B+",
        75..=79 => "B",
        70..=74 => "B-",
        65..=69 => "C+",
        60..=64 => "C",
        _ => "D",
    }
}

/// `0.4 * technical + 0.3 * communication + 0.3 * problem solving`, truncated.
fn weighted_overall(technical: u8, communication: u8, problem_solving: u8) -> u8 {
    let total = 4 * u32::from(technical) + 3 * u32::from(communication) + 3 * u32::from(problem_solving);
    (total / 10) as u8
}

fn final_metrics(session: &InterviewSession) -> InterviewMetrics {
    let communication = (60 + 5 * u64::from(session.question_count)).clamp(50, 100) as u8;
    let problem_solving = (55 + 8 * session.feedback_history.len() as u64).clamp(40, 100) as u8;
    let technical = match session.metrics.technical_score {
        0 => DEFAULT_TECHNICAL_SCORE,
        score => score,
    };
    let overall = weighted_overall(technical, communication, problem_solving);

    InterviewMetrics {
        technical_score: technical,
        communication_score: communication,
        problem_solving_score: problem_solving,
        overall_score: overall,
        total_questions: session.question_count,
        correct_answers: session.question_count.saturating_sub(1).max(1),
        response_quality: grade_for(overall).to_string(),
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rejects sessions that finished while the caller waited for the lock.
fn ensure_open(session: &InterviewSession) -> Result<()> {
    if session.state == InterviewState::Completed {
        return Err(RehearseError::SessionNotFound(session.session_id));
    }
    Ok(())
}

fn ensure_started(session: &InterviewSession) -> Result<()> {
    ensure_open(session)?;
    if session.state == InterviewState::Init {
        return Err(RehearseError::Validation(
            "Interview has not been started".to_string(),
        ));
    }
    Ok(())
}

/// Drives interview sessions.
pub struct InterviewManager {
    gateway: Arc<LlmGateway>,
    validator: Arc<CodeValidator>,
    registry: SessionRegistry,
    policy: InterviewPolicy,
}

impl InterviewManager {
    pub fn new(gateway: Arc<LlmGateway>, validator: Arc<CodeValidator>) -> Self {
        Self {
            gateway,
            validator,
            registry: SessionRegistry::new(),
            policy: InterviewPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: InterviewPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &InterviewPolicy {
        &self.policy
    }

    pub fn gateway(&self) -> &LlmGateway {
        &self.gateway
    }

    /// Register a new session in `Init`. `interview_type` is a free-form tag.
    pub async fn create_session(
        &self,
        interview_type: &str,
        candidate_name: &str,
        position: &str,
        difficulty_level: &str,
    ) -> Result<Uuid> {
        let interview_type: InterviewType = interview_type
            .parse()
            .map_err(RehearseError::InvalidInterviewType)?;
        let difficulty = match difficulty_level.trim() {
            "" => "medium",
            level => level,
        };

        let session = InterviewSession::new(interview_type, candidate_name, position, difficulty);
        let id = self.registry.insert(session).await;
        info!(
            target: "rehearse::session",
            "Created {} interview session {}", interview_type, id
        );
        Ok(id)
    }

    /// Ask the opening question. Only valid once, from `Init`.
    pub async fn start(&self, session_id: Uuid) -> Result<StartedInterview> {
        let handle = self.registry.active(session_id).await?;
        let mut session = handle.lock().await;
        ensure_open(&session)?;
        if session.state != InterviewState::Init {
            return Err(RehearseError::Validation(
                "Interview has already been started".to_string(),
            ));
        }

        session.state = InterviewState::Introduction;
        let question = self
            .gateway
            .start_interview(session.interview_type, &session.position, &session.difficulty_level)
            .await;

        session.current_question = question.clone();
        let turn = Turn::new(Role::Interviewer, question.clone(), session.state);
        session.record(turn);
        session.question_count += 1;

        let limits = self.policy.limits(session.interview_type);
        info!(target: "rehearse::session", "Started interview for session {}", session_id);

        Ok(StartedInterview {
            session_id,
            question,
            state: session.state,
            interview_type: session.interview_type,
            question_number: session.question_count,
            max_questions: limits.max_questions,
            time_limit_minutes: limits.time_limit_minutes,
        })
    }

    /// Record an answer and either ask the next question or end the interview.
    pub async fn process_answer(&self, session_id: Uuid, answer: &str) -> Result<AnswerOutcome> {
        if answer.trim().is_empty() {
            return Err(RehearseError::Validation("Answer cannot be empty".to_string()));
        }

        let handle = self.registry.active(session_id).await?;
        let mut session = handle.lock().await;
        ensure_started(&session)?;

        let turn = Turn::new(Role::Candidate, answer, session.state);
        session.record(turn);

        if !self.policy.should_continue(&session, Utc::now()) {
            debug!(
                target: "rehearse::session",
                "Session {} reached its limits after {} questions", session_id, session.question_count
            );
            let summary = self.finish(&mut session).await;
            return Ok(AnswerOutcome::Ended(summary));
        }

        let response = self
            .gateway
            .respond(session.interview_type, answer, &session.conversation_history)
            .await;
        let (feedback, next_question) = split_feedback_and_question(&response);

        session.current_question = next_question.clone();
        let turn = Turn::new(Role::Interviewer, response, session.state);
        session.record(turn);
        session.question_count += 1;
        session.feedback_history.push(feedback.clone());
        session.state = self.policy.next_state(session.state, session.question_count);

        debug!(
            target: "rehearse::session",
            "Session {} now at question {} ({})", session_id, session.question_count, session.state
        );

        Ok(AnswerOutcome::Continue(AnswerFeedback {
            session_id,
            feedback,
            next_question,
            state: session.state,
            question_number: session.question_count,
            progress_percentage: self.policy.progress(&session),
        }))
    }

    /// Validate and review submitted code, then ask the candidate to explain it.
    pub async fn submit_code(&self, session_id: Uuid, code: &str, language: &str) -> Result<CodeReview> {
        if code.trim().is_empty() {
            return Err(RehearseError::Validation("Code cannot be empty".to_string()));
        }

        let handle = self.registry.active(session_id).await?;
        let mut session = handle.lock().await;
        ensure_started(&session)?;

        session.state = InterviewState::CodeReview;
        let validation = self.validator.validate(code, language).await;
        let analysis = self.gateway.analyze_code(code, language).await;

        let turn = Turn::new(
            Role::Candidate,
            format!("Code submission ({language}):\n{code}"),
            session.state,
        )
        .with_metadata(TurnMetadata::CodeSubmission {
            language: language.to_string(),
            analysis: analysis.clone(),
            validation: validation.clone(),
        });
        session.record(turn);

        let metrics = &mut session.metrics;
        metrics.technical_score = metrics.technical_score.max(analysis.score);
        metrics.overall_score = weighted_overall(
            metrics.technical_score,
            metrics.communication_score,
            metrics.problem_solving_score,
        );

        let excerpt: String = analysis.feedback.chars().take(FOLLOW_UP_EXCERPT).collect();
        let follow_up = format!("程式碼分析完成。{excerpt}... 請解釋你的實現思路。");
        session.current_question = follow_up.clone();
        let turn = Turn::new(Role::Interviewer, follow_up.clone(), session.state);
        session.record(turn);

        info!(
            target: "rehearse::session",
            "Session {} code submission scored {} (valid={})",
            session_id,
            analysis.score,
            validation.is_valid
        );

        Ok(CodeReview {
            session_id,
            analysis,
            validation,
            follow_up_question: follow_up,
            state: session.state,
        })
    }

    /// End the interview on request.
    pub async fn end(&self, session_id: Uuid) -> Result<EndSummary> {
        let handle = self.registry.active(session_id).await?;
        let mut session = handle.lock().await;
        ensure_open(&session)?;
        Ok(self.finish(&mut session).await)
    }

    /// Snapshot of an active or completed session.
    pub async fn status(&self, session_id: Uuid) -> Result<SessionSnapshot> {
        let now = Utc::now();
        match self.registry.lookup(session_id).await? {
            SessionEntry::Active(handle) => {
                let session = handle.lock().await;
                Ok(self.snapshot(&session, now))
            }
            SessionEntry::Completed(session) => Ok(self.snapshot(&session, now)),
        }
    }

    pub async fn active_count(&self) -> usize {
        self.registry.active_count().await
    }

    pub async fn completed_count(&self) -> usize {
        self.registry.completed_count().await
    }

    fn snapshot(&self, session: &InterviewSession, now: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            session_id: session.session_id,
            state: session.state,
            interview_type: session.interview_type,
            candidate_name: session.candidate_name.clone(),
            position: session.position.clone(),
            difficulty_level: session.difficulty_level.clone(),
            duration_minutes: round_tenths(session.elapsed_minutes(now)),
            question_count: session.question_count,
            max_questions: self.policy.limits(session.interview_type).max_questions,
            progress_percentage: self.policy.progress(session),
            current_metrics: session.metrics.clone(),
            is_active: !session.state.is_terminal(),
        }
    }

    /// Complete the session while its lock is held, then move it to the
    /// completed map.
    async fn finish(&self, session: &mut InterviewSession) -> EndSummary {
        let now = Utc::now();
        session.state = InterviewState::Completed;
        session.end_time = Some(now);

        let summary = self.gateway.summarize(&session.conversation_history).await;
        let metrics = final_metrics(session);
        session.metrics = metrics.clone();

        self.registry.retire(session.clone()).await;
        info!(
            target: "rehearse::session",
            "Interview completed for session {} (score {}, grade {})",
            session.session_id,
            metrics.overall_score,
            metrics.response_quality
        );

        EndSummary {
            session_id: session.session_id,
            summary: summary.summary,
            final_score: metrics.overall_score,
            grade: metrics.response_quality.clone(),
            llm_grade: summary.grade,
            duration_minutes: round_tenths(session.elapsed_minutes(now)),
            total_questions: session.question_count,
            metrics,
            recommendations: summary.recommendations,
        }
    }
}
