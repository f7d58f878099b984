//! Search tuning parameters.

use serde::{Deserialize, Serialize};

/// Default similarity a term needs to count as a fuzzy hit.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.7;

/// Keywords routed to the category field by smart search.
pub const DEFAULT_CATEGORY_KEYWORDS: &[&str] = &["customer", "vendor", "manufacturer", "prospect"];

/// Smart-search and fuzzy-matching configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum similarity (inclusive) for a fuzzy term match
    pub fuzzy_threshold: f64,
    /// Words that classify a smart query as a category lookup
    pub category_keywords: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            category_keywords: DEFAULT_CATEGORY_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl SearchConfig {
    /// Override the fuzzy threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    /// Override the category keyword list.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.category_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), SearchConfigError> {
        if !(self.fuzzy_threshold > 0.0 && self.fuzzy_threshold <= 1.0) {
            return Err(SearchConfigError::ThresholdOutOfRange(self.fuzzy_threshold));
        }

        if self.category_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(SearchConfigError::NoCategoryKeywords);
        }

        Ok(())
    }
}

/// Search configuration validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchConfigError {
    #[error("fuzzy_threshold must be in (0, 1], got {0}")]
    ThresholdOutOfRange(f64),

    #[error("at least one category keyword is required")]
    NoCategoryKeywords,

    #[error("invalid category keyword pattern: {0}")]
    InvalidKeyword(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SearchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.category_keywords.len(), 4);
    }

    #[test]
    fn threshold_bounds() {
        assert!(SearchConfig::default().with_threshold(0.0).validate().is_err());
        assert!(SearchConfig::default().with_threshold(1.5).validate().is_err());
        assert!(SearchConfig::default().with_threshold(1.0).validate().is_ok());
    }

    #[test]
    fn blank_keywords_rejected() {
        let config = SearchConfig::default().with_keywords(["  "]);
        assert_eq!(config.validate(), Err(SearchConfigError::NoCategoryKeywords));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: SearchConfig = serde_json::from_str(r#"{"fuzzy_threshold": 0.8}"#).unwrap();
        assert!((config.fuzzy_threshold - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.category_keywords, SearchConfig::default().category_keywords);
    }
}
