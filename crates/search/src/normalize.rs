/// Canonical query form used for cache keys and term matching: lowercased,
/// underscores and dashes become spaces, runs of whitespace collapse to one
/// space, leading/trailing whitespace trimmed.
pub fn normalize_query(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            if !out.is_empty() {
                pending_space = true;
            }
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    out
}

/// Match terms of a normalized query. Terms shorter than two characters
/// carry no signal for substring matching and are dropped.
pub fn query_terms(normalized: &str) -> Vec<&str> {
    normalized
        .split_whitespace()
        .filter(|term| term.chars().count() >= 2)
        .collect()
}

/// Normalize an upstream similarity score to the integer 0-100 scale.
///
/// Backends disagree on scale: some report a 0-1 cosine fraction, others an
/// already-percentage value. Anything above 1 is taken as a percentage.
pub fn normalize_similarity(raw: f32) -> u8 {
    let scaled = if raw > 1.0 { raw } else { raw * 100.0 };
    scaled.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize_query("  AI_platform--demo  "), "ai platform demo");
        assert_eq!(normalize_query("Plumber\t\nAustin"), "plumber austin");
        assert_eq!(normalize_query("café"), "café");
    }

    #[test]
    fn normalize_of_blank_is_empty() {
        assert_eq!(normalize_query("   "), "");
        assert_eq!(normalize_query("_-_"), "");
        assert_eq!(normalize_query(""), "");
    }

    #[test]
    fn terms_drop_single_characters() {
        assert_eq!(query_terms("ai platform x"), vec!["ai", "platform"]);
        assert_eq!(query_terms("a b c"), Vec::<&str>::new());
    }

    #[test]
    fn similarity_handles_both_scales() {
        assert_eq!(normalize_similarity(0.82), 82);
        assert_eq!(normalize_similarity(0.3), 30);
        assert_eq!(normalize_similarity(0.0), 0);
        assert_eq!(normalize_similarity(1.0), 100);
        assert_eq!(normalize_similarity(82.4), 82);
        assert_eq!(normalize_similarity(150.0), 100);
        assert_eq!(normalize_similarity(-0.2), 0);
    }
}
