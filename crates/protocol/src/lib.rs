//! Wire types for the directory resolution engine.
//!
//! The engine exposes a single request/response pair: an inbound
//! conversational turn and the uniform response envelope. Everything here is
//! plain serde data; the consuming gateway publishes the derived JSON schemas.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod record;
mod result;

pub use record::DirectoryRecord;
pub use result::{ActionKind, Confidence, RankedResult, ResultAction};

/// Delivery channel the turn arrived on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    #[default]
    Chat,
    Whatsapp,
    Api,
}

/// Requested session lifecycle action. Defaults to `continue`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionAction {
    Start,
    #[default]
    Continue,
    End,
}

/// Resolved conversational capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Welcome,
    Goodbye,
    ListSegments,
    ListMembers,
    Search,
    GetContact,
    About,
    Explore,
    Unknown,
}

impl Intent {
    /// Parse an explicitly supplied intent string (wire name).
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase())).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Goodbye => "goodbye",
            Self::ListSegments => "list_segments",
            Self::ListMembers => "list_members",
            Self::Search => "search",
            Self::GetContact => "get_contact",
            Self::About => "about",
            Self::Explore => "explore",
            Self::Unknown => "unknown",
        }
    }
}

/// Machine-readable error code carried alongside the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    EmptyQuery,
    MissingIdentity,
    MissingScope,
    MissingEmbedding,
    BackendUnavailable,
}

/// Free-form parameters attached to a turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TurnParams {
    pub query: Option<String>,
    pub segment: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub membership_id: Option<String>,
    pub business_name: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// One inbound conversational turn.
///
/// At least one of `phone` / `user_id` identifies the speaker. `group_id`
/// names the directory scope and is required unless the capability is the
/// cross-scope contact lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TurnRequest {
    pub intent: Option<String>,
    pub message: Option<String>,
    pub phone: Option<String>,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub channel: Channel,
    pub session_action: SessionAction,
    pub params: TurnParams,
}

impl TurnRequest {
    /// Identity key for session tracking: phone wins over user id.
    pub fn identity(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| self.user_id.as_deref().filter(|u| !u.trim().is_empty()))
    }
}

/// Channel-specific template reference, populated only for WhatsApp turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WhatsappTemplate {
    pub name: String,
    /// Positional template parameters, in template order.
    pub parameters: Vec<String>,
}

/// The uniform response envelope. Every turn produces exactly one of these;
/// errors are folded in rather than propagated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TurnResponse {
    pub success: bool,
    pub intent: Intent,
    pub response_type: String,
    pub detail_level: String,
    pub message: String,
    pub results: Vec<RankedResult>,
    pub results_count: usize,
    pub session_id: Option<String>,
    pub is_new_session: bool,
    pub is_member: bool,
    pub group_id: Option<String>,
    pub group_name: Option<String>,
    pub channel: Channel,
    pub from_cache: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<WhatsappTemplate>,
}

impl TurnResponse {
    /// Empty scaffold for a turn on `channel`; the engine fills in the rest.
    pub fn empty(intent: Intent, channel: Channel) -> Self {
        Self {
            success: true,
            intent,
            response_type: String::new(),
            detail_level: "summary".to_string(),
            message: String::new(),
            results: Vec::new(),
            results_count: 0,
            session_id: None,
            is_new_session: false,
            is_member: false,
            group_id: None,
            group_name: None,
            channel,
            from_cache: false,
            duration_ms: 0,
            error: None,
            template: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intent_round_trips_wire_names() {
        assert_eq!(Intent::parse("list_members"), Some(Intent::ListMembers));
        assert_eq!(Intent::parse("  SEARCH "), Some(Intent::Search));
        assert_eq!(Intent::parse("bogus"), None);
        assert_eq!(Intent::ListSegments.as_str(), "list_segments");
    }

    #[test]
    fn identity_prefers_phone() {
        let req = TurnRequest {
            phone: Some("+15551234567".into()),
            user_id: Some("u-1".into()),
            ..Default::default()
        };
        assert_eq!(req.identity(), Some("+15551234567"));

        let req = TurnRequest {
            phone: Some("   ".into()),
            user_id: Some("u-1".into()),
            ..Default::default()
        };
        assert_eq!(req.identity(), Some("u-1"));

        assert_eq!(TurnRequest::default().identity(), None);
    }

    #[test]
    fn request_defaults_are_lenient() {
        let req: TurnRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(req.channel, Channel::Chat);
        assert_eq!(req.session_action, SessionAction::Continue);
        assert!(req.params.embedding.is_none());
    }

    #[test]
    fn error_code_is_omitted_when_absent() {
        let resp = TurnResponse::empty(Intent::Search, Channel::Api);
        let raw = serde_json::to_string(&resp).unwrap();
        assert!(!raw.contains("\"error\""));
        assert!(!raw.contains("\"template\""));
    }
}
