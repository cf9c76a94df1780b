// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for the web search adapter

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw text result as returned by a search provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextResult {
    /// Title of the result page
    pub title: String,
    /// Snippet/description of the result
    pub body: String,
    /// Link to the result page
    pub href: String,
}

/// A direct-answer result as returned by a search provider
///
/// Answers carry no title of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// The answer text
    pub text: String,
    /// Source URL of the answer
    pub url: String,
}

/// A normalized document in the pipeline's native representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Title of the source page (empty for answer-derived documents)
    pub title: String,
    /// Result snippet or answer text
    pub content: String,
    /// Link to the source page
    pub link: String,
}

/// Response from a search: normalized documents plus the raw result links
///
/// `links` is built from the text results only; answer-derived documents
/// never contribute a link, so the two sequences can diverge positionally
/// when answers are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Documents in provider order, answers first, truncated to `top_k`
    pub documents: Vec<Document>,
    /// Links of the text results, truncated to `top_k`
    pub links: Vec<String>,
}

/// Errors raised by search provider implementations
#[derive(Debug, Error)]
pub enum SearchError {
    /// Request to the provider timed out
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds
        timeout_ms: u64,
    },

    /// The provider returned an error response or the transport failed
    #[error("provider error: {status} - {message}")]
    Api {
        /// HTTP status code (0 when the request never completed)
        status: u16,
        /// Error message
        message: String,
    },

    /// Rate limited by the provider itself
    #[error("rate limited by the provider, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// The provider response could not be decoded
    #[error("failed to decode provider response: {reason}")]
    Decode {
        /// Why decoding failed
        reason: String,
    },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {reason}")]
    Client {
        /// Why construction failed
        reason: String,
    },
}

/// The single error kind surfaced by the adapter
///
/// Wraps any failure of an underlying provider call, names the operation
/// that failed and chains the original cause.
#[derive(Debug, Error)]
#[error("an error occurred while querying the search provider ({operation}): {source}")]
pub struct SearchProviderError {
    /// The operation that failed ("answers", "text search", ...)
    pub operation: &'static str,
    /// The underlying provider error
    #[source]
    pub source: SearchError,
}
