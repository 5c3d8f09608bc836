use crate::phone::phone_variants;
use crate::session::{epoch_secs, HistoryEntry, Session, SessionContext};
use crate::store::{MembershipRoster, SessionStore};
use directory_protocol::{Intent, SessionAction};
use std::sync::Arc;
use std::time::Duration;

/// Result of opening a session for a turn.
///
/// `session` is `None` on `end` and whenever persistence failed; a turn
/// always proceeds without a session rather than failing (fail-open).
#[derive(Debug, Clone, Default)]
pub struct TurnSession {
    pub session: Option<Session>,
    pub is_new: bool,
    pub is_member: bool,
}

impl TurnSession {
    pub fn session_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.id.as_str())
    }
}

/// Creates, continues and ends per-identity conversation sessions, and
/// snapshots directory membership at creation time.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    roster: Arc<dyn MembershipRoster>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        roster: Arc<dyn MembershipRoster>,
        ttl: Duration,
    ) -> Self {
        Self { store, roster, ttl }
    }

    /// Apply a session action for an identity within a scope. Never errors.
    pub async fn open(&self, identity: &str, scope_id: &str, action: SessionAction) -> TurnSession {
        match action {
            SessionAction::Start => self.start(identity, scope_id).await,
            SessionAction::Continue => self.resume(identity, scope_id).await,
            SessionAction::End => {
                if let Err(err) = self.store.end_for_identity(identity).await {
                    log::warn!("Ending session for {} failed: {}", identity, err);
                }
                TurnSession::default()
            }
        }
    }

    /// Unconditionally replace any existing session with a fresh one,
    /// snapshotting membership from the scope roster.
    async fn start(&self, identity: &str, scope_id: &str) -> TurnSession {
        if let Err(err) = self.store.end_for_identity(identity).await {
            log::warn!("Terminating previous session for {} failed: {}", identity, err);
        }

        let (is_member, membership_id) = self.lookup_membership(identity, scope_id).await;

        let now = epoch_secs();
        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            identity: identity.to_string(),
            scope_id: scope_id.to_string(),
            context: SessionContext {
                is_member,
                membership_id,
                ..SessionContext::default()
            },
            created_at: now,
            updated_at: now,
            expires_at: now + self.ttl.as_secs(),
        };

        match self.store.create(session.clone()).await {
            Ok(()) => {
                log::debug!(
                    "Created session {} for {} (member: {})",
                    session.id,
                    identity,
                    is_member
                );
                TurnSession {
                    session: Some(session),
                    is_new: true,
                    is_member,
                }
            }
            Err(err) => {
                log::warn!("Session create for {} failed, continuing without: {}", identity, err);
                TurnSession::default()
            }
        }
    }

    /// Load an unexpired session; membership comes from the stored context,
    /// not a fresh roster lookup. A missing session behaves like `start`.
    async fn resume(&self, identity: &str, scope_id: &str) -> TurnSession {
        match self.store.get_active(identity, epoch_secs()).await {
            Ok(Some(session)) => {
                let is_member = session.context.is_member;
                TurnSession {
                    session: Some(session),
                    is_new: false,
                    is_member,
                }
            }
            Ok(None) => self.start(identity, scope_id).await,
            Err(err) => {
                log::warn!("Session read for {} failed, continuing without: {}", identity, err);
                TurnSession::default()
            }
        }
    }

    /// Roster lookup over normalized phone variants; first match wins. Any
    /// failure (and any non-phone identity) snapshots as non-member.
    async fn lookup_membership(&self, identity: &str, scope_id: &str) -> (bool, Option<String>) {
        let variants = phone_variants(identity);
        if variants.is_empty() {
            return (false, None);
        }
        match self.roster.find_member(scope_id, &variants).await {
            Ok(Some(record)) => {
                let reference = record.membership_id.clone().unwrap_or(record.id);
                (true, Some(reference))
            }
            Ok(None) => (false, None),
            Err(err) => {
                log::warn!("Roster lookup for {} failed, defaulting to guest: {}", identity, err);
                (false, None)
            }
        }
    }

    /// Append the turn to conversation history and update the last intent.
    /// Fired without awaiting: a lost write never fails the turn.
    pub fn record_turn(&self, session: &Session, intent: Intent, message: Option<&str>) {
        let now = epoch_secs();
        let mut context = session.context.clone();
        context.last_intent = Some(intent);
        context.history.push(HistoryEntry {
            at: now,
            intent,
            message: message.map(str::to_string),
        });

        let store = self.store.clone();
        let session_id = session.id.clone();
        tokio::spawn(async move {
            if let Err(err) = store.update_context(&session_id, context, now).await {
                log::warn!("Recording turn on session {} failed: {}", session_id, err);
            }
        });
    }
}
