//! Error types for Rehearse.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RehearseError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    InvalidInterviewType(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Snippet not found: {0}")]
    SnippetNotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Failures of a single completion call against the remote model.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode model response: {0}")]
    Decode(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Model provider not configured: {0}")]
    NotConfigured(String),
}

impl From<LlmError> for RehearseError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::NotConfigured(msg) => RehearseError::ServiceUnavailable(msg),
            other => RehearseError::Upstream(other.to_string()),
        }
    }
}
