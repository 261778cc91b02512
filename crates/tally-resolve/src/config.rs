//! Resolver configuration.

use crate::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tally_store::Consolidation;

/// When a regular or unknown metric may fall back to ratio heads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioFallback {
    /// Only when no regular head matches the phrase at all
    #[default]
    OnEmpty,
    /// Also when regular heads match but none has rows
    OnNoData,
}

/// Tunables for the resolvers. Every field has a default, so an empty JSON
/// object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Ratio fallback policy for non-ratio metrics
    pub ratio_fallback: RatioFallback,
    /// Term code an explicit "FY" maps to
    pub fy_term_code: String,
    /// Term codes that count as annual for year-to-date lookups
    pub annual_term_codes: Vec<String>,
    /// Term code of trailing twelve month rows in the plain partition
    pub ttm_term_code: String,
    /// Phrase rewrites applied before head search, keyed lowercase
    pub metric_aliases: BTreeMap<String, String>,
    /// Consolidation used when a query does not name one
    pub default_consolidation: Consolidation,
    /// Maximum number of suggestions attached to a not-found error
    pub max_suggestions: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ratio_fallback: RatioFallback::default(),
            fy_term_code: "6M".to_string(),
            annual_term_codes: vec!["12M".to_string(), "FY".to_string()],
            ttm_term_code: "TTM".to_string(),
            metric_aliases: BTreeMap::new(),
            default_consolidation: Consolidation::default(),
            max_suggestions: 5,
        }
    }
}

impl ResolverConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ResolveError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| ResolveError::Config(e.to_string()))?;
        Ok(config.with_normalized_aliases())
    }

    /// Alias target for a phrase, if one is configured.
    pub fn alias_for(&self, phrase: &str) -> Option<&str> {
        self.metric_aliases
            .get(&phrase.trim().to_lowercase())
            .map(String::as_str)
    }

    fn with_normalized_aliases(mut self) -> Self {
        self.metric_aliases = self
            .metric_aliases
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = ResolverConfig::from_json("{}").unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.fy_term_code, "6M");
        assert_eq!(config.ratio_fallback, RatioFallback::OnEmpty);
        assert_eq!(config.default_consolidation, Consolidation::Unconsolidated);
    }

    #[test]
    fn test_partial_override() {
        let config = ResolverConfig::from_json(
            r#"{"fy_term_code": "12M", "ratio_fallback": "on_no_data",
                "metric_aliases": {"Sales": "Net Revenue"}}"#,
        )
        .unwrap();
        assert_eq!(config.fy_term_code, "12M");
        assert_eq!(config.ratio_fallback, RatioFallback::OnNoData);
        assert_eq!(config.alias_for(" SALES "), Some("Net Revenue"));
        assert_eq!(config.ttm_term_code, "TTM");
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            ResolverConfig::from_json("{\"fy_term_code\": 6}"),
            Err(ResolveError::Config(_))
        ));
    }
}
