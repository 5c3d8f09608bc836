use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Raw business/member record as stored in the external directory.
///
/// Read-only from this subsystem's perspective: rows are produced by the
/// datastore collaborators (vector hits, roster lookups, fallback scans) and
/// normalized into [`crate::RankedResult`] before they reach the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DirectoryRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub booking_url: Option<String>,
    pub membership_id: Option<String>,
}

impl DirectoryRecord {
    /// Concatenated case-folded text used by relevance re-filtering:
    /// name, description, industry plus the locale fields.
    pub fn searchable_text(&self) -> String {
        let mut text = self.fallback_text();
        for field in [self.city.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
        {
            text.push(' ');
            text.push_str(&field.to_lowercase());
        }
        text
    }

    /// Case-folded text scanned by the deterministic fallback search. A
    /// narrower set than [`Self::searchable_text`]: locale fields rescue a
    /// semantic hit from the relevance filter but never produce a fallback
    /// hit on their own.
    pub fn fallback_text(&self) -> String {
        let mut text = self.name.to_lowercase();
        for field in [self.description.as_deref(), self.industry.as_deref()]
            .into_iter()
            .flatten()
        {
            text.push(' ');
            text.push_str(&field.to_lowercase());
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_text_excludes_locale_fields() {
        let record = DirectoryRecord {
            id: "m-1".into(),
            name: "Acme Robotics".into(),
            description: Some("Industrial automation".into()),
            industry: Some("Manufacturing".into()),
            city: Some("Austin".into()),
            country: Some("USA".into()),
            ..Default::default()
        };
        let text = record.fallback_text();
        assert!(text.contains("acme robotics"));
        assert!(text.contains("manufacturing"));
        assert!(!text.contains("austin"));
        assert!(!text.contains("usa"));
    }

    #[test]
    fn searchable_text_folds_all_fields() {
        let record = DirectoryRecord {
            id: "m-1".into(),
            name: "Acme Robotics".into(),
            description: Some("Industrial AUTOMATION".into()),
            industry: Some("Manufacturing".into()),
            city: Some("Austin".into()),
            ..Default::default()
        };
        let text = record.searchable_text();
        assert!(text.contains("acme robotics"));
        assert!(text.contains("industrial automation"));
        assert!(text.contains("manufacturing"));
        assert!(text.contains("austin"));
    }
}
