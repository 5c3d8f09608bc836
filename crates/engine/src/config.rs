use anyhow::{Context, Result};
use directory_search::SearchSettings;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Freshness window for cached search results, in seconds.
    pub ttl_secs: u64,
    /// In-memory store capacity (entries).
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 60 * 60,
            capacity: 1024,
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Session lifetime, in seconds.
    pub ttl_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { ttl_secs: 30 * 60 }
    }
}

impl SessionSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Base URLs for synthesized deep links.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    pub card_base_url: String,
    pub vcard_base_url: String,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            card_base_url: "https://directory.example/card".to_string(),
            vcard_base_url: "https://directory.example/vcard".to_string(),
        }
    }
}

/// Engine configuration, loadable from TOML. Every section has production
/// defaults; an absent file or section just means defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchSettings,
    pub cache: CacheSettings,
    pub session: SessionSettings,
    pub links: LinkSettings,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use directory_search::MissingEmbeddingPolicy;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_match_production_values() {
        let config = EngineConfig::default();
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.session.ttl_secs, 1800);
        assert_eq!(config.search.default_limit, 10);
        assert_eq!(config.search.high_confidence, 65);
        assert_eq!(config.search.missing_embedding, MissingEmbeddingPolicy::TextFallback);
    }

    #[test]
    fn partial_toml_overrides_only_named_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "[search]\nsimilarity_threshold = 0.6\nmissing_embedding = \"reject\"\n\n[cache]\nttl_secs = 120\n"
        )
        .unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.search.similarity_threshold, 0.6);
        assert_eq!(config.search.missing_embedding, MissingEmbeddingPolicy::Reject);
        assert_eq!(config.cache.ttl_secs, 120);
        // Untouched sections keep defaults.
        assert_eq!(config.session.ttl_secs, 1800);
        assert_eq!(config.search.default_limit, 10);
    }
}
