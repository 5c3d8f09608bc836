use crate::error::Result;
use crate::session::{Session, SessionContext};
use async_trait::async_trait;
use directory_protocol::DirectoryRecord;
use std::collections::HashMap;
use std::sync::Mutex;

/// Session persistence seam.
///
/// Creation is deliberately unconditional: two racing `start` turns for one
/// identity may both create sessions, and `get_active` resolves the race by
/// returning the most recently created live one.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Most recently created unexpired session for the identity, if any.
    async fn get_active(&self, identity: &str, now: u64) -> Result<Option<Session>>;

    async fn create(&self, session: Session) -> Result<()>;

    /// Replace a session's context and bump its `updated_at`.
    async fn update_context(&self, session_id: &str, context: SessionContext, now: u64)
        -> Result<()>;

    /// Terminate every session for the identity. Idempotent.
    async fn end_for_identity(&self, identity: &str) -> Result<()>;
}

/// Membership roster lookup against the external directory.
#[async_trait]
pub trait MembershipRoster: Send + Sync {
    /// Zero-or-one roster record whose phone matches any supplied variant.
    async fn find_member(
        &self,
        scope_id: &str,
        phone_variants: &[String],
    ) -> Result<Option<DirectoryRecord>>;
}

/// HashMap-backed store for tests and single-process deployments.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Vec<Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get_active(&self, identity: &str, now: u64) -> Result<Option<Session>> {
        let sessions = match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(sessions
            .get(identity)
            .and_then(|list| {
                list.iter()
                    .filter(|s| !s.is_expired(now))
                    .max_by_key(|s| s.created_at)
            })
            .cloned())
    }

    async fn create(&self, session: Session) -> Result<()> {
        let mut sessions = match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sessions
            .entry(session.identity.clone())
            .or_default()
            .push(session);
        Ok(())
    }

    async fn update_context(
        &self,
        session_id: &str,
        context: SessionContext,
        now: u64,
    ) -> Result<()> {
        let mut sessions = match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for list in sessions.values_mut() {
            if let Some(session) = list.iter_mut().find(|s| s.id == session_id) {
                session.context = context;
                session.updated_at = now;
                return Ok(());
            }
        }
        // Updating a session that was ended mid-turn is not an error; the
        // write is simply lost.
        Ok(())
    }

    async fn end_for_identity(&self, identity: &str) -> Result<()> {
        let mut sessions = match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        sessions.remove(identity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::epoch_secs;

    fn session(id: &str, identity: &str, created_at: u64, expires_at: u64) -> Session {
        Session {
            id: id.to_string(),
            identity: identity.to_string(),
            scope_id: "g1".to_string(),
            context: SessionContext::default(),
            created_at,
            updated_at: created_at,
            expires_at,
        }
    }

    #[tokio::test]
    async fn newest_live_session_wins() {
        let store = MemorySessionStore::new();
        let now = epoch_secs();
        store.create(session("s-1", "p1", now - 100, now + 100)).await.unwrap();
        store.create(session("s-2", "p1", now - 10, now + 100)).await.unwrap();

        let active = store.get_active("p1", now).await.unwrap().unwrap();
        assert_eq!(active.id, "s-2");
    }

    #[tokio::test]
    async fn expired_sessions_are_invisible() {
        let store = MemorySessionStore::new();
        let now = epoch_secs();
        store.create(session("s-1", "p1", now - 100, now - 1)).await.unwrap();

        assert!(store.get_active("p1", now).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn end_is_idempotent() {
        let store = MemorySessionStore::new();
        store.end_for_identity("ghost").await.unwrap();
        let now = epoch_secs();
        store.create(session("s-1", "p1", now, now + 100)).await.unwrap();
        store.end_for_identity("p1").await.unwrap();
        store.end_for_identity("p1").await.unwrap();
        assert!(store.get_active("p1", now).await.unwrap().is_none());
    }
}
