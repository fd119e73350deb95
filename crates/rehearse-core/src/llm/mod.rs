//! LLM gateway: prompt construction, fail-soft completion with retry, and
//! lenient extraction of structured values from free-form model output.

pub mod extract;
mod gateway;
mod prompts;
mod provider;

pub use gateway::{LlmGateway, RetryPolicy, CONTEXT_TURNS};
pub use provider::{CompletionProvider, GeminiProvider};

#[cfg(test)]
pub(crate) use gateway::test_support;
