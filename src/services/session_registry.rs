use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::QuizSession,
};

pub type SessionHandle = Arc<Mutex<QuizSession>>;

struct SessionSlot {
    session_id: Uuid,
    session: SessionHandle,
}

/// Live quiz sessions, at most one per user. Each session sits behind its own
/// mutex so operations on one session run one at a time.
///
/// Finished sessions stay answerable (a repeated claim is still rejected as an
/// invalid transition) until they are older than `retention`, after which the
/// next insert drops them.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionSlot>>,
    retention: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        // One cooldown window; a user cannot start anything newer before then.
        Self::with_retention(Duration::days(1))
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            retention,
        }
    }

    /// Registers `session` as the user's live session, dropping any previous one
    /// along with other users' stale finished sessions.
    pub async fn insert(&self, session: QuizSession) -> SessionHandle {
        let user_id = session.user_id().to_string();
        let session_id = session.id();
        let handle = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;
        Self::prune(&mut sessions, Utc::now() - self.retention);
        if let Some(previous) = sessions.insert(
            user_id.clone(),
            SessionSlot {
                session_id,
                session: Arc::clone(&handle),
            },
        ) {
            log::debug!(
                "Session {} for user {} replaced by {}",
                previous.session_id,
                user_id,
                session_id
            );
        }

        handle
    }

    /// Drops finished sessions whose last activity is before `cutoff`.
    pub async fn prune_finished(&self, cutoff: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        Self::prune(&mut sessions, cutoff)
    }

    fn prune(sessions: &mut HashMap<String, SessionSlot>, cutoff: DateTime<Utc>) -> usize {
        let before = sessions.len();
        // A session locked by an in-flight operation is never stale.
        sessions.retain(|_, slot| match slot.session.try_lock() {
            Ok(session) => !(session.state().is_terminal() && session.last_activity() < cutoff),
            Err(_) => true,
        });

        let pruned = before - sessions.len();
        if pruned > 0 {
            log::debug!("Pruned {} finished quiz sessions", pruned);
        }
        pruned
    }

    pub async fn get(&self, user_id: &str, session_id: &Uuid) -> AppResult<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions
            .get(user_id)
            .filter(|slot| &slot.session_id == session_id)
            .map(|slot| Arc::clone(&slot.session))
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Quiz session '{}' not found for user '{}'",
                    session_id, user_id
                ))
            })
    }

    /// Discards a session. Nothing was persisted for it, so this has no other effect.
    pub async fn remove(&self, user_id: &str, session_id: &Uuid) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(user_id) {
            Some(slot) if &slot.session_id == session_id => {
                sessions.remove(user_id);
                Ok(())
            }
            _ => Err(AppError::NotFound(format!(
                "Quiz session '{}' not found for user '{}'",
                session_id, user_id
            ))),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_insert_and_get() {
        let registry = SessionRegistry::new();
        let session = QuizSession::new("user-1", None, Utc::now());
        let id = session.id();

        registry.insert(session).await;

        let handle = registry.get("user-1", &id).await.unwrap();
        assert_eq!(handle.lock().await.id(), id);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_with_wrong_user_or_id_is_not_found() {
        let registry = SessionRegistry::new();
        let session = QuizSession::new("user-1", None, Utc::now());
        let id = session.id();
        registry.insert(session).await;

        assert!(matches!(
            registry.get("user-2", &id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            registry.get("user-1", &Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_new_session_replaces_previous_for_same_user() {
        let registry = SessionRegistry::new();
        let first = QuizSession::new("user-1", None, Utc::now());
        let first_id = first.id();
        let second = QuizSession::new("user-1", None, Utc::now());
        let second_id = second.id();

        registry.insert(first).await;
        registry.insert(second).await;

        assert_eq!(registry.len().await, 1);
        assert!(registry.get("user-1", &first_id).await.is_err());
        assert!(registry.get("user-1", &second_id).await.is_ok());
    }

    fn closed_session(user_id: &str, started_at: DateTime<Utc>) -> QuizSession {
        let mut session = QuizSession::new(user_id, None, started_at);
        session.close().unwrap();
        session
    }

    #[tokio::test]
    async fn test_insert_drops_stale_finished_sessions() {
        let registry = SessionRegistry::new();
        let stale = closed_session("user-old", Utc::now() - Duration::days(2));
        let stale_id = stale.id();
        let recent = closed_session("user-recent", Utc::now());
        let recent_id = recent.id();
        registry.insert(stale).await;
        registry.insert(recent).await;

        registry
            .insert(QuizSession::new("user-new", None, Utc::now()))
            .await;

        assert_eq!(registry.len().await, 2);
        assert!(registry.get("user-old", &stale_id).await.is_err());
        assert!(registry.get("user-recent", &recent_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_prune_keeps_unfinished_sessions() {
        let registry = SessionRegistry::new();
        let long_running = QuizSession::new("user-1", None, Utc::now() - Duration::days(3));
        let id = long_running.id();
        registry.insert(long_running).await;

        let pruned = registry.prune_finished(Utc::now()).await;

        assert_eq!(pruned, 0);
        assert!(registry.get("user-1", &id).await.is_ok());
    }

    #[tokio::test]
    async fn test_prune_skips_sessions_in_use() {
        let registry = SessionRegistry::with_retention(Duration::zero());
        let session = closed_session("user-1", Utc::now() - Duration::days(2));
        let id = session.id();
        let handle = registry.insert(session).await;

        let _guard = handle.lock().await;
        assert_eq!(registry.prune_finished(Utc::now()).await, 0);
        assert!(registry.get("user-1", &id).await.is_ok());
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = SessionRegistry::new();
        let session = QuizSession::new("user-1", None, Utc::now());
        let id = session.id();
        registry.insert(session).await;

        assert!(registry.remove("user-1", &Uuid::new_v4()).await.is_err());
        registry.remove("user-1", &id).await.unwrap();

        assert!(registry.is_empty().await);
        assert!(registry.remove("user-1", &id).await.is_err());
    }
}
