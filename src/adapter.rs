// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web search adapter orchestration
//!
//! Ties the rate limiter, the search provider and result normalization
//! together behind the two entry points the pipeline calls: `run` and the
//! snapshot hooks.

use std::time::Duration;
use tracing::debug;

use crate::config::WebSearchConfig;
use crate::duckduckgo::DuckDuckGoClient;
use crate::provider::{SearchProvider, TextSearchParams};
use crate::rate_limiter::SearchRateLimiter;
use crate::types::{Document, SearchOutcome, SearchProviderError};

/// Web search adapter for document-processing pipelines
///
/// Accepts a text query, forwards it (optionally rate-limited) to the
/// search provider and returns the results as normalized documents plus the
/// raw result links, both truncated to `top_k`.
pub struct WebSearchAdapter {
    config: WebSearchConfig,
    provider: Box<dyn SearchProvider>,
    rate_limiter: SearchRateLimiter,
}

impl WebSearchAdapter {
    /// Create an adapter backed by the DuckDuckGo client
    ///
    /// Instantiates the provider client bound to the configured proxy and
    /// timeout. No other configuration is validated here; invalid options
    /// surface through provider errors once a search is attempted.
    pub fn new(config: WebSearchConfig) -> Result<Self, SearchProviderError> {
        let provider =
            DuckDuckGoClient::new(config.proxy.as_deref(), Duration::from_secs(config.timeout))
                .map_err(|source| SearchProviderError {
                    operation: "client construction",
                    source,
                })?;

        Ok(Self::with_provider(config, Box::new(provider)))
    }

    /// Create an adapter with a custom provider implementation
    pub fn with_provider(config: WebSearchConfig, provider: Box<dyn SearchProvider>) -> Self {
        let rate_limiter = SearchRateLimiter::new(config.min_search_interval);
        Self {
            config,
            provider,
            rate_limiter,
        }
    }

    /// Snapshot of the configuration for pipeline persistence
    ///
    /// The rate-limit interval is not part of the persisted identity; serde
    /// drops it when the snapshot is serialized.
    pub fn to_snapshot(&self) -> WebSearchConfig {
        self.config.clone()
    }

    /// Rebuild an adapter from a persisted snapshot
    pub fn from_snapshot(snapshot: WebSearchConfig) -> Result<Self, SearchProviderError> {
        Self::new(snapshot)
    }

    /// Get the active configuration
    pub fn config(&self) -> &WebSearchConfig {
        &self.config
    }

    /// Run a search
    ///
    /// Blocks (asynchronously) on the rate limiter first, queries direct
    /// answers when enabled, then performs the text search with the
    /// effective query. Answer-derived documents precede text-derived ones;
    /// the links list is built from the text results only.
    ///
    /// # Arguments
    /// * `query` - Search query. Empty queries are forwarded to the
    ///   provider unmodified.
    ///
    /// # Returns
    /// The documents and links, truncated to `top_k`, or the wrapped
    /// provider error.
    pub async fn run(&self, query: &str) -> Result<SearchOutcome, SearchProviderError> {
        self.rate_limiter.gate().await;

        let mut documents = Vec::new();

        if self.config.use_answers {
            let answers =
                self.provider
                    .answers(query)
                    .await
                    .map_err(|source| SearchProviderError {
                        operation: "answers",
                        source,
                    })?;

            documents.extend(answers.into_iter().map(|answer| Document {
                title: String::new(),
                content: answer.text,
                link: answer.url,
            }));
        }

        let query = if self.config.allowed_domain.is_empty() {
            query.to_string()
        } else {
            format!("site:{} {}", self.config.allowed_domain, query)
        };

        let params = TextSearchParams {
            keywords: query.clone(),
            max_results: self.config.max_results,
            region: self.config.region.clone(),
            safesearch: self.config.safesearch,
            timelimit: self.config.timelimit,
            backend: self.config.backend,
        };

        let results =
            self.provider
                .text_search(&params)
                .await
                .map_err(|source| SearchProviderError {
                    operation: "text search",
                    source,
                })?;

        let mut links: Vec<String> = results.iter().map(|result| result.href.clone()).collect();
        documents.extend(results.into_iter().map(|result| Document {
            title: result.title,
            content: result.body,
            link: result.href,
        }));

        if let Some(top_k) = self.config.top_k {
            documents.truncate(top_k);
            links.truncate(top_k);
        }

        debug!(
            "{} returned {} documents for the query '{}'",
            self.provider.name(),
            documents.len(),
            query
        );

        Ok(SearchOutcome { documents, links })
    }
}
