//! Fail-soft gateway in front of a completion provider.

use super::extract::{
    extract_complexity, extract_grade, extract_recommendations, extract_score, extract_suggestions,
};
use super::prompts;
use super::provider::CompletionProvider;
use crate::LlmError;
use rehearse_types::{CodeAnalysis, ComplexityLevel, InterviewSummary, InterviewType, Turn};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Most recent turns replayed to the model as context.
pub const CONTEXT_TURNS: usize = 10;

/// Longest code the model is asked to review.
pub const MAX_ANALYSIS_CODE_LENGTH: usize = 10_000;

const APOLOGY_EXHAUSTED: &str = "抱歉，目前遇到技術問題。請稍後再試。";
const APOLOGY_EMPTY: &str = "抱歉，我需要一點時間思考。請重新描述你的問題。";

/// Bounded exponential backoff for completion calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Why a completion produced no usable text.
#[derive(Debug)]
pub(crate) enum Degraded {
    /// Every attempt failed.
    Exhausted { attempts: u32, last_error: LlmError },
    /// The model answered with nothing.
    Empty,
}

impl std::fmt::Display for Degraded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degraded::Exhausted { attempts, last_error } => {
                write!(f, "gave up after {attempts} attempts: {last_error}")
            }
            Degraded::Empty => f.write_str("empty response"),
        }
    }
}

impl Degraded {
    /// Stand-in text handed to callers instead of an error.
    fn apology(&self) -> &'static str {
        match self {
            Degraded::Exhausted { .. } => APOLOGY_EXHAUSTED,
            Degraded::Empty => APOLOGY_EMPTY,
        }
    }
}

/// Interview-facing operations over a [`CompletionProvider`].
///
/// Never returns an error: upstream failures are retried and then replaced
/// by degraded but well-formed output so a session can carry on.
pub struct LlmGateway {
    provider: Arc<dyn CompletionProvider>,
    retry: RetryPolicy,
    status_timeout: Duration,
}

impl LlmGateway {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self {
            provider,
            retry: RetryPolicy::default(),
            status_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_status_timeout(mut self, timeout: Duration) -> Self {
        self.status_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    /// Complete `prompt`, prefixed with up to [`CONTEXT_TURNS`] recent turns.
    pub async fn complete(&self, prompt: &str, context: &[Turn]) -> String {
        match self.try_complete(prompt, context).await {
            Ok(text) => text,
            Err(degraded) => {
                debug!(target: "rehearse::llm", "Completion degraded: {}", degraded);
                degraded.apology().to_string()
            }
        }
    }

    pub(crate) async fn try_complete(&self, prompt: &str, context: &[Turn]) -> Result<String, Degraded> {
        let full_prompt = if context.is_empty() {
            prompt.to_string()
        } else {
            let recent = &context[context.len().saturating_sub(CONTEXT_TURNS)..];
            let history = recent
                .iter()
                .map(Turn::transcript_line)
                .collect::<Vec<_>>()
                .join("\n");
            prompts::with_context(prompt, &history)
        };

        let max_attempts = self.retry.max_attempts.max(1);
        let mut delay = self.retry.base_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.provider.complete(&full_prompt).await {
                Ok(text) => return Ok(text),
                Err(LlmError::EmptyResponse) => {
                    warn!(target: "rehearse::llm", "Empty response from {}", self.provider.model());
                    return Err(Degraded::Empty);
                }
                Err(e) if attempt >= max_attempts => {
                    error!(target: "rehearse::llm", "All {} completion attempts failed: {}", attempt, e);
                    return Err(Degraded::Exhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    warn!(
                        target: "rehearse::llm",
                        "Completion failed (attempt {}/{}): {}, retrying in {:?}",
                        attempt, max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    /// Opening message from the interviewer.
    pub async fn start_interview(
        &self,
        interview_type: InterviewType,
        position: &str,
        difficulty: &str,
    ) -> String {
        self.complete(&prompts::opening_prompt(interview_type, position, difficulty), &[])
            .await
    }

    /// Feedback plus a follow-up question for a candidate answer.
    pub async fn respond(&self, interview_type: InterviewType, answer: &str, history: &[Turn]) -> String {
        self.complete(&prompts::follow_up_prompt(interview_type, answer), history)
            .await
    }

    /// A fresh standalone question.
    pub async fn generate_question(&self, interview_type: InterviewType, difficulty: &str) -> String {
        self.complete(&prompts::question_prompt(interview_type, difficulty), &[])
            .await
    }

    pub async fn analyze_code(&self, code: &str, language: &str) -> CodeAnalysis {
        let length = code.chars().count();
        if length > MAX_ANALYSIS_CODE_LENGTH {
            return CodeAnalysis {
                score: 0,
                feedback: format!(
                    "程式碼過長（{length} 字符）。請提供較短的程式碼片段（最多 {MAX_ANALYSIS_CODE_LENGTH} 字符）。"
                ),
                suggestions: vec!["減少程式碼長度".to_string()],
                language: language.to_string(),
                complexity: ComplexityLevel::Unknown,
            };
        }

        match self.try_complete(&prompts::code_analysis_prompt(code, language), &[]).await {
            Ok(text) => CodeAnalysis {
                score: extract_score(&text),
                complexity: extract_complexity(&text),
                suggestions: extract_suggestions(&text),
                language: language.to_string(),
                feedback: text,
            },
            Err(degraded) => {
                debug!(target: "rehearse::llm", "Code analysis degraded: {}", degraded);
                CodeAnalysis {
                    score: 50,
                    feedback: format!(
                        "程式碼分析遇到技術問題。基本觀察：這是一段 {language} 程式碼，建議檢查語法和邏輯。"
                    ),
                    suggestions: vec![
                        "檢查語法正確性".to_string(),
                        "確認邏輯流程".to_string(),
                        "添加適當註解".to_string(),
                    ],
                    language: language.to_string(),
                    complexity: ComplexityLevel::Medium,
                }
            }
        }
    }

    /// Holistic summary over a full transcript.
    pub async fn summarize(&self, history: &[Turn]) -> InterviewSummary {
        let transcript = history
            .iter()
            .map(Turn::transcript_line)
            .collect::<Vec<_>>()
            .join("\n");

        match self.try_complete(&prompts::summary_prompt(&transcript), &[]).await {
            Ok(text) => InterviewSummary {
                grade: extract_grade(&text),
                recommendations: extract_recommendations(&text),
                summary: text,
            },
            Err(degraded) => {
                debug!(target: "rehearse::llm", "Summary degraded: {}", degraded);
                InterviewSummary {
                    summary: "面試總結產生遇到技術問題。建議重新檢視面試過程。".to_string(),
                    grade: "B".to_string(),
                    recommendations: vec!["持續練習技術問題".to_string(), "加強表達能力".to_string()],
                }
            }
        }
    }

    /// Single probe call bounded by the status timeout.
    pub async fn check_status(&self) -> bool {
        match tokio::time::timeout(self.status_timeout, self.provider.complete("ping")).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(target: "rehearse::llm", "Status probe failed: {}", e);
                false
            }
            Err(_) => {
                warn!(target: "rehearse::llm", "Status probe timed out after {:?}", self.status_timeout);
                false
            }
        }
    }
}
