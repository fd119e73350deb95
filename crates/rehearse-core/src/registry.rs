//! Active and completed session maps.

use std::collections::HashMap;
use std::sync::Arc;

use rehearse_types::InterviewSession;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::{RehearseError, Result};

/// Shared handle to one live session. Holding the lock makes an operation
/// atomic with respect to every other operation on the same session.
pub type SessionHandle = Arc<Mutex<InterviewSession>>;

/// Where a lookup found a session.
pub enum SessionEntry {
    Active(SessionHandle),
    Completed(InterviewSession),
}

/// Owns every session for the lifetime of the process.
///
/// A session id is always in exactly one of the two maps. Both locks are
/// taken in the same order (active, then completed) wherever both are held.
#[derive(Default)]
pub struct SessionRegistry {
    active: RwLock<HashMap<Uuid, SessionHandle>>,
    completed: RwLock<HashMap<Uuid, InterviewSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: InterviewSession) -> Uuid {
        let id = session.session_id;
        self.active
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        debug!(target: "rehearse::session", "Registered session {}", id);
        id
    }

    /// Handle to an active session.
    pub async fn active(&self, id: Uuid) -> Result<SessionHandle> {
        self.active
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RehearseError::SessionNotFound(id))
    }

    /// Look in both maps under one consistent view.
    pub async fn lookup(&self, id: Uuid) -> Result<SessionEntry> {
        let active = self.active.read().await;
        let completed = self.completed.read().await;

        if let Some(handle) = active.get(&id) {
            return Ok(SessionEntry::Active(handle.clone()));
        }
        completed
            .get(&id)
            .cloned()
            .map(SessionEntry::Completed)
            .ok_or(RehearseError::SessionNotFound(id))
    }

    /// Move a finished session from active to completed in one step.
    pub async fn retire(&self, session: InterviewSession) {
        let id = session.session_id;
        let mut active = self.active.write().await;
        let mut completed = self.completed.write().await;
        active.remove(&id);
        completed.insert(id, session);
        debug!(target: "rehearse::session", "Moved session {} to completed", id);
    }

    pub async fn active_count(&self) -> usize {
        self.active.read().await.len()
    }

    pub async fn completed_count(&self) -> usize {
        self.completed.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehearse_types::{InterviewState, InterviewType};

    fn session() -> InterviewSession {
        InterviewSession::new(InterviewType::Technical, "Ada", "Backend", "medium")
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let registry = SessionRegistry::new();
        let id = registry.insert(session()).await;

        let handle = registry.active(id).await.unwrap();
        assert_eq!(handle.lock().await.candidate_name, "Ada");
        assert!(matches!(registry.lookup(id).await.unwrap(), SessionEntry::Active(_)));
        assert_eq!(registry.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let registry = SessionRegistry::new();
        let id = Uuid::new_v4();
        assert!(matches!(
            registry.active(id).await,
            Err(RehearseError::SessionNotFound(missing)) if missing == id
        ));
        assert!(registry.lookup(id).await.is_err());
    }

    #[tokio::test]
    async fn test_retire_moves_session() {
        let registry = SessionRegistry::new();
        let id = registry.insert(session()).await;

        let mut finished = registry.active(id).await.unwrap().lock().await.clone();
        finished.state = InterviewState::Completed;
        registry.retire(finished).await;

        assert!(registry.active(id).await.is_err());
        match registry.lookup(id).await.unwrap() {
            SessionEntry::Completed(s) => assert_eq!(s.state, InterviewState::Completed),
            SessionEntry::Active(_) => panic!("session should be completed"),
        }
        assert_eq!(registry.active_count().await, 0);
        assert_eq!(registry.completed_count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_session_in_exactly_one_map_under_concurrency() {
        let registry = Arc::new(SessionRegistry::new());
        let mut ids = Vec::new();
        for _ in 0..32 {
            ids.push(registry.insert(session()).await);
        }

        let mut tasks = Vec::new();
        for id in ids.clone() {
            let retiring = registry.clone();
            tasks.push(tokio::spawn(async move {
                let handle = retiring.active(id).await.unwrap();
                let snapshot = handle.lock().await.clone();
                retiring.retire(snapshot).await;
            }));
            let looking = registry.clone();
            tasks.push(tokio::spawn(async move {
                // Must always find the session in one map or the other.
                assert!(looking.lookup(id).await.is_ok());
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(registry.active_count().await, 0);
        assert_eq!(registry.completed_count().await, ids.len());
    }
}
