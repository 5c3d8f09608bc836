use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Human-readable confidence bucket derived from normalized similarity.
///
/// Presentational only: it never participates in ranking or filtering, and
/// adapters always re-derive it from `similarity` rather than trusting a
/// stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Confidence {
    Excellent,
    High,
    Good,
    Fair,
    Low,
}

impl Confidence {
    /// Bucket a 0-100 similarity score.
    pub fn from_similarity(similarity: u8) -> Self {
        match similarity {
            80..=u8::MAX => Self::Excellent,
            65..=79 => Self::High,
            50..=64 => Self::Good,
            40..=49 => Self::Fair,
            _ => Self::Low,
        }
    }
}

/// Contact channels a result can expose, in fixed display priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    Call,
    Whatsapp,
    Email,
    Website,
    Booking,
    ViewCard,
    SaveContact,
}

/// One actionable contact channel on a ranked result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResultAction {
    pub kind: ActionKind,
    pub value: String,
}

/// A single normalized, ranked search/listing hit.
///
/// `rank` is 1-based and contiguous within a result list; `similarity` is
/// always on the integer 0-100 scale regardless of what the upstream source
/// reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankedResult {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub city: Option<String>,
    pub similarity: u8,
    pub confidence: Confidence,
    pub card_url: String,
    pub vcard_url: String,
    pub actions: Vec<ResultAction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn confidence_buckets() {
        assert_eq!(Confidence::from_similarity(100), Confidence::Excellent);
        assert_eq!(Confidence::from_similarity(80), Confidence::Excellent);
        assert_eq!(Confidence::from_similarity(79), Confidence::High);
        assert_eq!(Confidence::from_similarity(65), Confidence::High);
        assert_eq!(Confidence::from_similarity(50), Confidence::Good);
        assert_eq!(Confidence::from_similarity(40), Confidence::Fair);
        assert_eq!(Confidence::from_similarity(39), Confidence::Low);
        assert_eq!(Confidence::from_similarity(0), Confidence::Low);
    }

    #[test]
    fn action_kind_wire_names_are_kebab_case() {
        let raw = serde_json::to_string(&ActionKind::ViewCard).unwrap();
        assert_eq!(raw, "\"view-card\"");
        let raw = serde_json::to_string(&ActionKind::SaveContact).unwrap();
        assert_eq!(raw, "\"save-contact\"");
    }
}
