use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::Session;

/// In-memory session registry shared by all handlers.
///
/// Handlers never hold the lock across a model call: they take a snapshot
/// with `get`, do the slow work, then write back with `update`.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Session {
        let session = Session::new(Uuid::new_v4());
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        info!("Session {} created", session.id);
        session
    }

    /// Returns a snapshot of the session and marks it as recently used.
    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.last_seen_at = Utc::now();
        Ok(session.clone())
    }

    /// Applies `f` to the stored session under the write lock.
    /// If `f` fails, whatever it already changed is kept; callers validate first.
    pub async fn update<T, F>(&self, id: Uuid, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Session) -> Result<T, AppError>,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        session.last_seen_at = Utc::now();
        f(session)
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| not_found(id))?;
        info!("Session {id} ended");
        Ok(())
    }

    /// Drops sessions idle for longer than `ttl`. Returns how many were dropped.
    pub async fn purge_expired(&self, ttl: chrono::Duration) -> usize {
        let cutoff = Utc::now() - ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen_at >= cutoff);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Session {id} not found"))
}

/// Spawns the background task that purges idle sessions every `every`.
pub fn spawn_sweeper(store: SessionStore, ttl: Duration, every: Duration) -> JoinHandle<()> {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await; // first tick fires immediately
        loop {
            interval.tick().await;
            let purged = store.purge_expired(ttl).await;
            if purged > 0 {
                info!("Purged {purged} idle session(s)");
            } else {
                debug!("Session sweep: nothing to purge");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get() {
        let store = SessionStore::new();
        let created = store.create().await;
        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched.id, created.id);
        assert!(fetched.last_seen_at >= created.last_seen_at);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let store = SessionStore::new();
        let err = store.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_mutates_stored_session() {
        let store = SessionStore::new();
        let id = store.create().await.id;
        store
            .update(id, |s| {
                s.feedback = Some("Solid answers".to_string());
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(
            store.get(id).await.unwrap().feedback.as_deref(),
            Some("Solid answers")
        );
    }

    #[tokio::test]
    async fn test_remove_ends_session() {
        let store = SessionStore::new();
        let id = store.create().await.id;
        store.remove(id).await.unwrap();
        assert!(store.get(id).await.is_err());
        assert!(store.remove(id).await.is_err());
    }

    #[tokio::test]
    async fn test_purge_drops_only_idle_sessions() {
        let store = SessionStore::new();
        let stale = store.create().await.id;
        let fresh = store.create().await.id;
        store
            .update(stale, |s| {
                s.last_seen_at = Utc::now() - chrono::Duration::hours(2);
                Ok(())
            })
            .await
            .unwrap();

        let purged = store.purge_expired(chrono::Duration::hours(1)).await;

        assert_eq!(purged, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get(fresh).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_on_interval() {
        let store = SessionStore::new();
        let id = store.create().await.id;
        store
            .update(id, |s| {
                s.last_seen_at = Utc::now() - chrono::Duration::hours(2);
                Ok(())
            })
            .await
            .unwrap();

        let handle = spawn_sweeper(
            store.clone(),
            Duration::from_secs(3600),
            Duration::from_secs(60),
        );
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert_eq!(store.len().await, 0);
        handle.abort();
    }
}
