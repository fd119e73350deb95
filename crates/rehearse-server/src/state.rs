//! Shared application state.

use crate::config::Config;
use rehearse_core::{
    CodeValidator, CompletionProvider, GeminiProvider, InterviewManager, LlmGateway, SnippetStore,
};
use std::sync::Arc;
use tracing::warn;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// `None` when no API key was configured; interview and LLM routes
    /// answer 503 in that case.
    pub manager: Option<Arc<InterviewManager>>,
    pub validator: Arc<CodeValidator>,
    pub snippets: Arc<SnippetStore>,
}

impl AppState {
    pub fn new(config: Config) -> rehearse_core::Result<Self> {
        let provider: Option<Arc<dyn CompletionProvider>> = match config.api_key() {
            Some(key) => {
                let provider = GeminiProvider::new(key, Some(config.gemini_model.clone()))?;
                Some(Arc::new(provider))
            }
            None => {
                warn!(
                    target: "rehearse::startup",
                    "GEMINI_API_KEY not set; interview and LLM routes are disabled"
                );
                None
            }
        };
        Ok(Self::build(config, provider))
    }

    /// State backed by an arbitrary completion provider.
    pub fn with_provider(config: Config, provider: Arc<dyn CompletionProvider>) -> Self {
        Self::build(config, Some(provider))
    }

    fn build(config: Config, provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        let validator = Arc::new(CodeValidator::new(config.compiler_config()));
        let snippets = Arc::new(SnippetStore::new(validator.clone()));
        let manager = provider.map(|provider| {
            let gateway = LlmGateway::new(provider)
                .with_retry(config.retry_policy())
                .with_status_timeout(config.status_timeout());
            Arc::new(
                InterviewManager::new(Arc::new(gateway), validator.clone())
                    .with_policy(config.interview.clone()),
            )
        });

        Self {
            config,
            manager,
            validator,
            snippets,
        }
    }

    /// The interview manager, or `ServiceUnavailable` when the LLM is not configured.
    pub fn manager(&self) -> rehearse_core::Result<&Arc<InterviewManager>> {
        self.manager.as_ref().ok_or_else(|| {
            rehearse_core::RehearseError::ServiceUnavailable(
                "Gemini API key not configured".to_string(),
            )
        })
    }
}
