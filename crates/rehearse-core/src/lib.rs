//! Core interview logic for Rehearse: the session state machine, the code
//! validator, the snippet store and the LLM gateway.

mod error;
mod format;
pub mod llm;
mod registry;
mod session;
mod snippets;
pub mod validator;

pub use error::{LlmError, RehearseError};
pub use format::format_code;
pub use llm::{CompletionProvider, GeminiProvider, LlmGateway, RetryPolicy};
pub use registry::{SessionEntry, SessionHandle, SessionRegistry};
pub use session::{InterviewManager, InterviewPolicy, TypeLimits, grade_for};
pub use snippets::{SnippetStore, StoreSnippetRequest};
pub use validator::{CodeValidator, CompilerConfig, SyntaxStrategy};

/// Result type for Rehearse operations.
pub type Result<T> = std::result::Result<T, RehearseError>;
