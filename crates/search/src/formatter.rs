use crate::hit::RawHit;
use crate::normalize::normalize_similarity;
use directory_protocol::{
    ActionKind, Confidence, DirectoryRecord, RankedResult, ResultAction,
};

/// Similarity assigned to every deterministic fallback hit.
pub const FALLBACK_SIMILARITY: u8 = 50;

const MAX_DESCRIPTION_CHARS: usize = 200;

/// Normalizes heterogeneous raw hits into the uniform ranked result shape.
///
/// Deterministic: identical input yields byte-identical output. Ranks are
/// assigned 1..N in input order; confidence is always re-derived from the
/// normalized similarity, including for cached hits.
#[derive(Debug, Clone)]
pub struct ResultFormatter {
    card_base_url: String,
    vcard_base_url: String,
}

impl ResultFormatter {
    pub fn new(card_base_url: impl Into<String>, vcard_base_url: impl Into<String>) -> Self {
        Self {
            card_base_url: trim_slash(card_base_url.into()),
            vcard_base_url: trim_slash(vcard_base_url.into()),
        }
    }

    pub fn format(&self, hits: Vec<RawHit>) -> Vec<RankedResult> {
        hits.into_iter()
            .enumerate()
            .map(|(idx, hit)| self.format_one(idx + 1, hit))
            .collect()
    }

    fn format_one(&self, rank: usize, hit: RawHit) -> RankedResult {
        match hit {
            RawHit::Vector { record, similarity } => {
                self.from_record(rank, record, normalize_similarity(similarity))
            }
            RawHit::Fallback(record) => self.from_record(rank, record, FALLBACK_SIMILARITY),
            RawHit::Cached(result) => Self::from_cached(rank, result),
        }
    }

    fn from_record(&self, rank: usize, record: DirectoryRecord, similarity: u8) -> RankedResult {
        let card_url = format!("{}/{}", self.card_base_url, record.id);
        let vcard_url = format!("{}/{}", self.vcard_base_url, record.id);
        let actions = build_actions(&record, &card_url, &vcard_url);

        RankedResult {
            rank,
            id: record.id,
            name: record.name,
            description: record.description.map(|d| truncate_chars(&d, MAX_DESCRIPTION_CHARS)),
            industry: record.industry,
            city: record.city.map(|c| strip_line_breaks(&c)),
            similarity,
            confidence: Confidence::from_similarity(similarity),
            card_url,
            vcard_url,
            actions,
        }
    }

    /// Cached hits were formatted at write time; only rank and confidence
    /// are recomputed (confidence is derived, never trusted from storage).
    fn from_cached(rank: usize, mut result: RankedResult) -> RankedResult {
        result.rank = rank;
        result.confidence = Confidence::from_similarity(result.similarity);
        result
    }
}

/// Action list in the fixed priority order, one entry per populated channel.
fn build_actions(record: &DirectoryRecord, card_url: &str, vcard_url: &str) -> Vec<ResultAction> {
    let channels = [
        (ActionKind::Call, record.phone.as_deref()),
        (ActionKind::Whatsapp, record.whatsapp.as_deref()),
        (ActionKind::Email, record.email.as_deref()),
        (ActionKind::Website, record.website.as_deref()),
        (ActionKind::Booking, record.booking_url.as_deref()),
        (ActionKind::ViewCard, Some(card_url)),
        (ActionKind::SaveContact, Some(vcard_url)),
    ];

    channels
        .into_iter()
        .filter_map(|(kind, value)| {
            let value = value?.trim();
            (!value.is_empty()).then(|| ResultAction {
                kind,
                value: value.to_string(),
            })
        })
        .collect()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

fn strip_line_breaks(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim().to_string()
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn formatter() -> ResultFormatter {
        ResultFormatter::new("https://directory.test/card/", "https://directory.test/vcard")
    }

    fn record(id: &str, name: &str) -> DirectoryRecord {
        DirectoryRecord {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn ranks_are_contiguous_in_input_order() {
        let hits = vec![
            RawHit::Vector {
                record: record("m-3", "Gamma"),
                similarity: 0.4,
            },
            RawHit::Fallback(record("m-1", "Alpha")),
            RawHit::Fallback(record("m-2", "Beta")),
        ];
        let results = formatter().format(hits);
        assert_eq!(
            results.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(results[0].name, "Gamma");
        assert_eq!(results[2].name, "Beta");
    }

    #[test]
    fn vector_similarity_is_normalized_and_fallback_is_fixed() {
        let results = formatter().format(vec![
            RawHit::Vector {
                record: record("m-1", "Acme"),
                similarity: 0.82,
            },
            RawHit::Fallback(record("m-2", "Globex")),
        ]);
        assert_eq!(results[0].similarity, 82);
        assert_eq!(results[0].confidence, Confidence::Excellent);
        assert_eq!(results[1].similarity, FALLBACK_SIMILARITY);
        assert_eq!(results[1].confidence, Confidence::Good);
    }

    #[test]
    fn description_is_truncated_to_200_chars() {
        let mut r = record("m-1", "Acme");
        r.description = Some("x".repeat(450));
        let results = formatter().format(vec![RawHit::Fallback(r)]);
        let description = results[0].description.as_deref().unwrap();
        assert_eq!(description.chars().count(), 200);
    }

    #[test]
    fn city_line_breaks_are_stripped() {
        let mut r = record("m-1", "Acme");
        r.city = Some("Austin\r\nTexas".to_string());
        let results = formatter().format(vec![RawHit::Fallback(r)]);
        assert_eq!(results[0].city.as_deref(), Some("Austin  Texas"));
    }

    #[test]
    fn deep_links_are_keyed_by_record_id() {
        let results = formatter().format(vec![RawHit::Fallback(record("m-42", "Acme"))]);
        assert_eq!(results[0].card_url, "https://directory.test/card/m-42");
        assert_eq!(results[0].vcard_url, "https://directory.test/vcard/m-42");
    }

    #[test]
    fn actions_follow_fixed_priority_and_skip_empty_channels() {
        let mut r = record("m-1", "Acme");
        r.phone = Some("+15551234567".to_string());
        r.email = Some("hello@acme.test".to_string());
        r.website = Some("   ".to_string()); // blank channel is omitted
        let results = formatter().format(vec![RawHit::Fallback(r)]);

        let kinds: Vec<ActionKind> = results[0].actions.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::Call,
                ActionKind::Email,
                ActionKind::ViewCard,
                ActionKind::SaveContact,
            ]
        );
        assert_eq!(results[0].actions[0].value, "+15551234567");
    }

    #[test]
    fn cached_hits_keep_payload_but_rerank_and_rederive_confidence() {
        let mut cached = formatter().format(vec![RawHit::Vector {
            record: record("m-1", "Acme"),
            similarity: 0.9,
        }]);
        let mut hit = cached.remove(0);
        hit.rank = 7; // stale rank from a previous list
        hit.confidence = Confidence::Low; // stored value is never trusted

        let results = formatter().format(vec![RawHit::Cached(hit)]);
        assert_eq!(results[0].rank, 1);
        assert_eq!(results[0].similarity, 90);
        assert_eq!(results[0].confidence, Confidence::Excellent);
    }

    #[test]
    fn formatting_is_deterministic() {
        let hits = || {
            vec![RawHit::Vector {
                record: DirectoryRecord {
                    id: "m-1".into(),
                    name: "Acme".into(),
                    description: Some("Industrial automation".into()),
                    phone: Some("+15551234567".into()),
                    ..Default::default()
                },
                similarity: 0.73,
            }]
        };
        let a = serde_json::to_vec(&formatter().format(hits())).unwrap();
        let b = serde_json::to_vec(&formatter().format(hits())).unwrap();
        assert_eq!(a, b);
    }
}
