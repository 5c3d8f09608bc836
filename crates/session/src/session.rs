use directory_protocol::Intent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// One recorded conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: u64,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Mutable conversation context carried by a session.
///
/// The membership snapshot lives here: it is computed once at session
/// creation and read back on every continue, never refreshed from the
/// roster while the session is alive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionContext {
    pub is_member: bool,
    pub membership_id: Option<String>,
    pub last_intent: Option<Intent>,
    pub values: BTreeMap<String, serde_json::Value>,
    pub history: Vec<HistoryEntry>,
}

/// Per-identity conversation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Identity key: phone number or user id, as supplied by the gateway.
    pub identity: String,
    pub scope_id: String,
    pub context: SessionContext,
    pub created_at: u64,
    pub updated_at: u64,
    pub expires_at: u64,
}

impl Session {
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expires_at
    }
}
