use directory_protocol::{DirectoryRecord, RankedResult};

/// A raw hit before formatting, tagged by where it came from.
///
/// Each source reports results in its own shape (vector hits carry an
/// unnormalized score, fallback rows carry none, cached hits are already
/// formatted); the formatter owns one adapter per variant instead of
/// coalescing fields inline at every call site.
#[derive(Debug, Clone)]
pub enum RawHit {
    /// Semantic hit with the backend's raw similarity score.
    Vector {
        record: DirectoryRecord,
        similarity: f32,
    },
    /// Previously formatted result replayed from the query cache.
    Cached(RankedResult),
    /// Deterministic substring match; similarity is fixed at 50.
    Fallback(DirectoryRecord),
}

impl RawHit {
    /// Case-folded text the relevance re-filter matches query terms against.
    pub fn searchable_text(&self) -> String {
        match self {
            Self::Vector { record, .. } | Self::Fallback(record) => record.searchable_text(),
            Self::Cached(result) => {
                let mut text = result.name.to_lowercase();
                for field in [
                    result.description.as_deref(),
                    result.industry.as_deref(),
                    result.city.as_deref(),
                ]
                .into_iter()
                .flatten()
                {
                    text.push(' ');
                    text.push_str(&field.to_lowercase());
                }
                text
            }
        }
    }
}
