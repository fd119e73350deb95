//! In-memory store of validated code submissions.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rehearse_types::CodeSnippet;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::validator::CodeValidator;

/// Hex characters kept from the digest.
const SNIPPET_ID_LEN: usize = 16;

/// A submission to validate and keep.
#[derive(Debug, Clone)]
pub struct StoreSnippetRequest {
    pub session_id: Uuid,
    pub code: String,
    pub language: String,
    pub problem_description: String,
    pub is_solution: bool,
}

struct StoredSnippet {
    sequence: u64,
    snippet: CodeSnippet,
}

/// Append-only snippet map keyed by snippet id.
///
/// Snippets refer to sessions by id only; nothing here is removed when a
/// session ends.
pub struct SnippetStore {
    validator: Arc<CodeValidator>,
    snippets: DashMap<String, StoredSnippet>,
    sequence: AtomicU64,
}

impl SnippetStore {
    pub fn new(validator: Arc<CodeValidator>) -> Self {
        Self {
            validator,
            snippets: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Validate and store a submission. The stored result is never recomputed.
    pub async fn store(&self, request: StoreSnippetRequest) -> CodeSnippet {
        let validation_result = self.validator.validate(&request.code, &request.language).await;
        let timestamp = Utc::now();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let snippet_id = derive_snippet_id(request.session_id, &request.code, timestamp, sequence);

        let snippet = CodeSnippet {
            snippet_id: snippet_id.clone(),
            session_id: request.session_id,
            code: request.code,
            language: request.language,
            timestamp,
            validation_result,
            is_solution: request.is_solution,
            problem_description: request.problem_description,
        };

        info!(
            target: "rehearse::snippets",
            "Stored snippet {} for session {} (valid={})",
            snippet_id,
            snippet.session_id,
            snippet.validation_result.is_valid
        );
        self.snippets.insert(
            snippet_id,
            StoredSnippet {
                sequence,
                snippet: snippet.clone(),
            },
        );
        snippet
    }

    pub fn get(&self, snippet_id: &str) -> Option<CodeSnippet> {
        self.snippets.get(snippet_id).map(|entry| entry.snippet.clone())
    }

    /// Snippets for one session, oldest first.
    pub fn list_for_session(&self, session_id: Uuid) -> Vec<CodeSnippet> {
        let mut snippets: Vec<(u64, CodeSnippet)> = self
            .snippets
            .iter()
            .filter(|entry| entry.snippet.session_id == session_id)
            .map(|entry| (entry.sequence, entry.snippet.clone()))
            .collect();
        snippets.sort_by_key(|(sequence, _)| *sequence);
        snippets.into_iter().map(|(_, snippet)| snippet).collect()
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

/// Digest of session, code and submission time, plus a sequence number so
/// identical resubmissions within one clock tick still get distinct ids.
fn derive_snippet_id(session_id: Uuid, code: &str, timestamp: DateTime<Utc>, sequence: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(session_id.as_bytes());
    hasher.update(code.as_bytes());
    hasher.update(timestamp.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    hasher.update(sequence.to_le_bytes());
    let hash = format!("{:x}", hasher.finalize());
    hash[..SNIPPET_ID_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::CompilerConfig;
    use std::path::PathBuf;

    fn store() -> SnippetStore {
        SnippetStore::new(Arc::new(CodeValidator::new(CompilerConfig {
            program: PathBuf::from("/nonexistent/rehearse-g++"),
            ..CompilerConfig::default()
        })))
    }

    fn request(session_id: Uuid, code: &str) -> StoreSnippetRequest {
        StoreSnippetRequest {
            session_id,
            code: code.to_string(),
            language: "python".to_string(),
            problem_description: "two sum".to_string(),
            is_solution: true,
        }
    }

    #[tokio::test]
    async fn test_store_then_get_is_identical() {
        let store = store();
        let session = Uuid::new_v4();
        let stored = store.store(request(session, "def f():\n    return 1\n")).await;

        assert_eq!(stored.snippet_id.len(), SNIPPET_ID_LEN);
        let fetched = store.get(&stored.snippet_id).expect("snippet should exist");
        assert_eq!(fetched, stored);
        assert!(fetched.validation_result.is_valid);
        assert_eq!(fetched.problem_description, "two sum");
    }

    #[tokio::test]
    async fn test_invalid_code_is_still_stored() {
        let store = store();
        let stored = store.store(request(Uuid::new_v4(), "abc")).await;
        assert!(!stored.validation_result.is_valid);
        assert!(store.get(&stored.snippet_id).is_some());
    }

    #[tokio::test]
    async fn test_resubmission_gets_new_id() {
        let store = store();
        let session = Uuid::new_v4();
        let a = store.store(request(session, "x = 1")).await;
        let b = store.store(request(session, "x = 1")).await;
        assert_ne!(a.snippet_id, b.snippet_id);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_list_for_session() {
        let store = store();
        let mine = Uuid::new_v4();
        let other = Uuid::new_v4();
        let first = store.store(request(mine, "x = 1")).await;
        store.store(request(other, "y = 2")).await;
        let second = store.store(request(mine, "z = 3")).await;

        let listed = store.list_for_session(mine);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].snippet_id, first.snippet_id);
        assert_eq!(listed[1].snippet_id, second.snippet_id);
        assert!(store.list_for_session(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_get_missing() {
        assert!(store().get("does-not-exist").is_none());
        assert!(store().is_empty());
    }
}
