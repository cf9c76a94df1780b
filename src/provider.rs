// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Search provider trait definition

use async_trait::async_trait;

use crate::config::{Backend, SafeSearch, Timelimit};
use crate::types::{AnswerResult, SearchError, TextResult};

/// Parameters for a text search, as forwarded to the provider
#[derive(Debug, Clone)]
pub struct TextSearchParams {
    /// Effective query string, including any `site:` restriction
    pub keywords: String,
    /// Maximum number of results to return (`None` = provider default)
    pub max_results: Option<usize>,
    /// Region code
    pub region: String,
    /// Safe-search level
    pub safesearch: SafeSearch,
    /// Recency filter
    pub timelimit: Option<Timelimit>,
    /// Backend to query
    pub backend: Backend,
}

/// Trait for implementing search providers
///
/// The adapter treats the provider as an opaque pair of query functions;
/// transport and response decoding live behind this trait. Both methods may
/// fail with a provider-defined [`SearchError`].
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Perform a general text search
    ///
    /// # Arguments
    /// * `params` - Effective query plus the remaining search options
    ///
    /// # Returns
    /// Raw text results in provider order, or an error
    async fn text_search(&self, params: &TextSearchParams)
        -> Result<Vec<TextResult>, SearchError>;

    /// Query the provider's direct answers for the raw query string
    async fn answers(&self, query: &str) -> Result<Vec<AnswerResult>, SearchError>;

    /// Get the provider name for logging
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockProvider;

    #[async_trait]
    impl SearchProvider for MockProvider {
        async fn text_search(
            &self,
            params: &TextSearchParams,
        ) -> Result<Vec<TextResult>, SearchError> {
            Ok(vec![TextResult {
                title: format!("Result for {}", params.keywords),
                body: "A mock result".to_string(),
                href: "https://example.com".to_string(),
            }])
        }

        async fn answers(&self, query: &str) -> Result<Vec<AnswerResult>, SearchError> {
            Ok(vec![AnswerResult {
                text: format!("Answer for {}", query),
                url: "https://example.com/answer".to_string(),
            }])
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    fn params(keywords: &str) -> TextSearchParams {
        TextSearchParams {
            keywords: keywords.to_string(),
            max_results: Some(10),
            region: "wt-wt".to_string(),
            safesearch: SafeSearch::Moderate,
            timelimit: None,
            backend: Backend::Api,
        }
    }

    #[tokio::test]
    async fn test_mock_provider_text_search() {
        let provider = MockProvider;
        let results = provider.text_search(&params("test")).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].title.contains("test"));
    }

    #[tokio::test]
    async fn test_mock_provider_answers() {
        let provider = MockProvider;
        let answers = provider.answers("test").await.unwrap();
        assert_eq!(answers.len(), 1);
        assert!(answers[0].text.contains("test"));
    }

    #[test]
    fn test_mock_provider_name() {
        let provider = MockProvider;
        assert_eq!(provider.name(), "mock");
    }
}
