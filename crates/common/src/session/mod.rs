//! In-memory session store
//!
//! Holds per-session workflow state with TTL-based expiry and a per-session
//! run guard that rejects concurrent queries on the same session.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::errors::{AppError, Result};
use crate::models::WorkflowState;

struct SessionEntry {
    state: WorkflowState,
    last_accessed: Instant,
    /// Run guard: held for the duration of one workflow run
    guard: Arc<Mutex<()>>,
}

/// Thread-safe session store with TTL expiry.
///
/// A session expires `ttl` after its last access; expired sessions are
/// dropped lazily on access and eagerly by [`purge_expired`]. A session
/// whose run guard is held is never dropped, so an in-flight workflow
/// keeps its exclusivity even across expiry.
///
/// [`purge_expired`]: SessionStore::purge_expired
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    ttl: Duration,
}

/// Exclusive hold on a session for one workflow run.
///
/// Dropping the guard releases the session for the next query.
#[derive(Debug)]
pub struct SessionGuard {
    _guard: OwnedMutexGuard<()>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Get the session state, creating a fresh one if absent or expired.
    pub async fn create_or_get(&self, session_id: &str, workflow_id: &str) -> WorkflowState {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        if let Some(entry) = sessions.get_mut(session_id) {
            if now.duration_since(entry.last_accessed) < self.ttl {
                entry.last_accessed = now;
                return entry.state.clone();
            }
            // Expired: replace the state but keep the run guard, so a run
            // still in flight keeps excluding new queries
            let state = WorkflowState::new(session_id, workflow_id);
            entry.state = state.clone();
            entry.last_accessed = now;
            return state;
        }

        let state = WorkflowState::new(session_id, workflow_id);
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                state: state.clone(),
                last_accessed: now,
                guard: Arc::new(Mutex::new(())),
            },
        );
        state
    }

    /// Get the session state if present and unexpired.
    pub async fn get(&self, session_id: &str) -> Option<WorkflowState> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();

        let expired_and_idle = match sessions.get_mut(session_id) {
            Some(entry) if now.duration_since(entry.last_accessed) < self.ttl => {
                entry.last_accessed = now;
                return Some(entry.state.clone());
            }
            // Expired entries are dropped only when no run holds the guard
            Some(entry) => entry.guard.try_lock().is_ok(),
            None => return None,
        };

        if expired_and_idle {
            sessions.remove(session_id);
        }
        None
    }

    /// Replace the stored state for an existing session.
    pub async fn update(&self, state: WorkflowState) -> Result<()> {
        let mut sessions = self.sessions.lock().await;
        let entry = sessions
            .get_mut(&state.session_id)
            .ok_or_else(|| AppError::SessionNotFound {
                id: state.session_id.clone(),
            })?;
        entry.state = state;
        entry.last_accessed = Instant::now();
        Ok(())
    }

    /// Acquire the run guard for a session, or fail fast if a workflow is
    /// already running on it.
    pub async fn acquire(&self, session_id: &str) -> Result<SessionGuard> {
        let guard = {
            let sessions = self.sessions.lock().await;
            let entry = sessions
                .get(session_id)
                .ok_or_else(|| AppError::SessionNotFound {
                    id: session_id.to_string(),
                })?;
            Arc::clone(&entry.guard)
        };

        match guard.try_lock_owned() {
            Ok(lock) => Ok(SessionGuard { _guard: lock }),
            Err(_) => Err(AppError::SessionBusy {
                id: session_id.to_string(),
            }),
        }
    }

    /// Remove a session. Returns whether it existed.
    pub async fn clear(&self, session_id: &str) -> bool {
        self.sessions.lock().await.remove(session_id).is_some()
    }

    /// Drop all idle sessions past their TTL. Returns the number removed.
    /// Sessions whose run guard is currently held are kept regardless.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            now.duration_since(entry.last_accessed) < self.ttl
                || entry.guard.try_lock().is_err()
        });
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, "Purged expired sessions");
        }
        removed
    }

    /// Number of live sessions (including expired but not yet purged)
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_or_get_returns_existing() {
        let store = SessionStore::new(Duration::from_secs(60));
        let first = store.create_or_get("s-1", "w-1").await;
        let second = store.create_or_get("s-1", "w-2").await;
        // Unexpired session keeps its original workflow id
        assert_eq!(second.workflow_id, first.workflow_id);
    }

    #[tokio::test]
    async fn test_expired_session_is_replaced() {
        let store = SessionStore::new(Duration::from_millis(10));
        store.create_or_get("s-1", "w-1").await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fresh = store.create_or_get("s-1", "w-2").await;
        assert_eq!(fresh.workflow_id, "w-2");
    }

    #[tokio::test]
    async fn test_acquire_rejects_concurrent_run() {
        let store = SessionStore::new(Duration::from_secs(60));
        store.create_or_get("s-1", "w-1").await;

        let held = store.acquire("s-1").await.unwrap();
        let err = store.acquire("s-1").await.unwrap_err();
        assert!(matches!(err, AppError::SessionBusy { .. }));

        drop(held);
        assert!(store.acquire("s-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_clear_and_purge() {
        let store = SessionStore::new(Duration::from_millis(10));
        store.create_or_get("s-1", "w-1").await;
        store.create_or_get("s-2", "w-2").await;

        assert!(store.clear("s-1").await);
        assert!(!store.clear("s-1").await);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.purge_expired().await, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_expired_replacement_keeps_run_guard() {
        let store = SessionStore::new(Duration::from_millis(10));
        store.create_or_get("s-1", "w-1").await;
        let held = store.acquire("s-1").await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;

        // Expiry replaces the state but the in-flight run still excludes
        // a concurrent query on the same session
        let fresh = store.create_or_get("s-1", "w-2").await;
        assert_eq!(fresh.workflow_id, "w-2");
        let err = store.acquire("s-1").await.unwrap_err();
        assert!(matches!(err, AppError::SessionBusy { .. }));

        drop(held);
        assert!(store.acquire("s-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_purge_keeps_sessions_with_runs_in_flight() {
        let store = SessionStore::new(Duration::from_millis(10));
        store.create_or_get("s-1", "w-1").await;
        let held = store.acquire("s-1").await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.purge_expired().await, 0);

        drop(held);
        assert_eq!(store.purge_expired().await, 1);
    }

    #[tokio::test]
    async fn test_get_drops_expired() {
        let store = SessionStore::new(Duration::from_millis(10));
        store.create_or_get("s-1", "w-1").await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(store.get("s-1").await.is_none());
    }
}
