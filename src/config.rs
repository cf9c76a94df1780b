// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the web search adapter
//!
//! The serde form of [`WebSearchConfig`] is the snapshot the host pipeline
//! persists. Every field has a default so snapshots from older pipelines
//! deserialize cleanly; the rate-limit interval is excluded from snapshots
//! because it is not part of the adapter's persisted identity.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Safe-search level forwarded to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SafeSearch {
    /// Strict filtering
    On,
    /// Default filtering
    #[default]
    Moderate,
    /// No filtering
    Off,
}

impl SafeSearch {
    /// Wire value for the DuckDuckGo `p` parameter
    pub fn as_param(self) -> &'static str {
        match self {
            SafeSearch::On => "1",
            SafeSearch::Moderate => "-1",
            SafeSearch::Off => "-2",
        }
    }
}

/// Provider backend used for text searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// JSON endpoint (`links.duckduckgo.com/d.js`)
    #[default]
    Api,
    /// Full HTML interface (`html.duckduckgo.com`)
    Html,
    /// Lightweight HTML interface (`lite.duckduckgo.com`)
    Lite,
}

/// Recency filter for text searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timelimit {
    /// Past day
    #[serde(rename = "d")]
    Day,
    /// Past week
    #[serde(rename = "w")]
    Week,
    /// Past month
    #[serde(rename = "m")]
    Month,
    /// Past year
    #[serde(rename = "y")]
    Year,
}

impl Timelimit {
    /// Wire value for the DuckDuckGo `df` parameter
    pub fn as_param(self) -> &'static str {
        match self {
            Timelimit::Day => "d",
            Timelimit::Week => "w",
            Timelimit::Month => "m",
            Timelimit::Year => "y",
        }
    }
}

/// Configuration for the web search adapter
///
/// Created at construction time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchConfig {
    /// Maximum number of documents to return (`None` = unbounded)
    #[serde(default = "default_top_k")]
    pub top_k: Option<usize>,
    /// Maximum number of results to request from the provider
    #[serde(default = "default_max_results")]
    pub max_results: Option<usize>,
    /// Region code (`wt-wt` = no region)
    #[serde(default = "default_region")]
    pub region: String,
    /// Safe-search level
    #[serde(default)]
    pub safesearch: SafeSearch,
    /// Recency filter
    #[serde(default)]
    pub timelimit: Option<Timelimit>,
    /// Backend used for text searches
    #[serde(default)]
    pub backend: Backend,
    /// When non-empty, every text query is prefixed with `site:<domain>`
    ///
    /// DuckDuckGo does not support the `OR` operator, so only a single
    /// domain can be given.
    #[serde(default)]
    pub allowed_domain: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Also query the provider's direct answers
    #[serde(default)]
    pub use_answers: bool,
    /// Proxy address for the provider client
    #[serde(default)]
    pub proxy: Option<String>,
    /// Minimum interval between consecutive searches (`None` = no limit)
    ///
    /// Excluded from snapshots.
    #[serde(skip)]
    pub min_search_interval: Option<Duration>,
}

fn default_top_k() -> Option<usize> {
    Some(10)
}

fn default_max_results() -> Option<usize> {
    Some(10)
}

fn default_region() -> String {
    "wt-wt".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_results: default_max_results(),
            region: default_region(),
            safesearch: SafeSearch::default(),
            timelimit: None,
            backend: Backend::default(),
            allowed_domain: String::new(),
            timeout: default_timeout(),
            use_answers: false,
            proxy: None,
            min_search_interval: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WebSearchConfig::default();
        assert_eq!(config.top_k, Some(10));
        assert_eq!(config.max_results, Some(10));
        assert_eq!(config.region, "wt-wt");
        assert_eq!(config.safesearch, SafeSearch::Moderate);
        assert_eq!(config.timelimit, None);
        assert_eq!(config.backend, Backend::Api);
        assert!(config.allowed_domain.is_empty());
        assert_eq!(config.timeout, 10);
        assert!(!config.use_answers);
        assert!(config.proxy.is_none());
        assert!(config.min_search_interval.is_none());
    }

    #[test]
    fn test_snapshot_excludes_rate_interval() {
        let config = WebSearchConfig {
            min_search_interval: Some(Duration::from_secs(5)),
            ..Default::default()
        };

        let value = serde_json::to_value(&config).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("min_search_interval"));
        assert!(object.contains_key("top_k"));
    }

    #[test]
    fn test_empty_snapshot_uses_defaults() {
        let config: WebSearchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, WebSearchConfig::default());
    }

    #[test]
    fn test_partial_snapshot_fills_missing_fields() {
        let config: WebSearchConfig =
            serde_json::from_str(r#"{"top_k": 3, "use_answers": true}"#).unwrap();
        assert_eq!(config.top_k, Some(3));
        assert!(config.use_answers);
        assert_eq!(config.region, "wt-wt");
        assert_eq!(config.backend, Backend::Api);
    }

    #[test]
    fn test_safesearch_wire_values() {
        assert_eq!(SafeSearch::On.as_param(), "1");
        assert_eq!(SafeSearch::Moderate.as_param(), "-1");
        assert_eq!(SafeSearch::Off.as_param(), "-2");
    }

    #[test]
    fn test_timelimit_wire_values() {
        assert_eq!(Timelimit::Day.as_param(), "d");
        assert_eq!(Timelimit::Week.as_param(), "w");
        assert_eq!(Timelimit::Month.as_param(), "m");
        assert_eq!(Timelimit::Year.as_param(), "y");
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&Backend::Lite).unwrap(), "\"lite\"");
        assert_eq!(
            serde_json::to_string(&SafeSearch::Moderate).unwrap(),
            "\"moderate\""
        );
        assert_eq!(serde_json::to_string(&Timelimit::Week).unwrap(), "\"w\"");

        let backend: Backend = serde_json::from_str("\"html\"").unwrap();
        assert_eq!(backend, Backend::Html);
    }
}
