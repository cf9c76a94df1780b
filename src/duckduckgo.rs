// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! DuckDuckGo search provider
//!
//! Implements text search against DuckDuckGo's api, html and lite
//! endpoints plus direct answers against the instant-answer API.
//! No API key required.

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Proxy};
use scraper::{Html, Selector};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::Backend;
use crate::provider::{SearchProvider, TextSearchParams};
use crate::types::{AnswerResult, SearchError, TextResult};

const DDG_URL: &str = "https://duckduckgo.com/";
const DDG_API_URL: &str = "https://links.duckduckgo.com/d.js";
const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const DDG_LITE_URL: &str = "https://lite.duckduckgo.com/lite/";
const DDG_ANSWERS_URL: &str = "https://api.duckduckgo.com/";

// Realistic browser User-Agent to avoid being blocked
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// DuckDuckGo search client (no API key required)
pub struct DuckDuckGoClient {
    client: Client,
    timeout: Duration,
}

impl DuckDuckGoClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `proxy` - Optional proxy address routed through for all requests
    /// * `timeout` - Per-request timeout
    pub fn new(proxy: Option<&str>, timeout: Duration) -> Result<Self, SearchError> {
        let mut builder = Client::builder().timeout(timeout).user_agent(USER_AGENT);

        if let Some(proxy) = proxy {
            let proxy = Proxy::all(proxy).map_err(|e| SearchError::Client {
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().map_err(|e| SearchError::Client {
            reason: e.to_string(),
        })?;

        Ok(Self { client, timeout })
    }

    fn request_error(&self, e: reqwest::Error) -> SearchError {
        if e.is_timeout() {
            SearchError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            SearchError::Api {
                status: 0,
                message: e.to_string(),
            }
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SearchError> {
        let status = response.status();

        if status.as_u16() == 429 {
            return Err(SearchError::RateLimited {
                retry_after_secs: 60,
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Fetch the `vqd` token DuckDuckGo requires for `d.js` requests
    async fn fetch_vqd(&self, query: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .get(DDG_URL)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let response = Self::check_status(response).await?;
        let body = response.text().await.map_err(|e| self.request_error(e))?;

        extract_vqd(&body).ok_or_else(|| SearchError::Decode {
            reason: "vqd token not found in response".to_string(),
        })
    }

    async fn text_api(&self, params: &TextSearchParams) -> Result<Vec<TextResult>, SearchError> {
        let vqd = self.fetch_vqd(&params.keywords).await?;

        let mut query = vec![
            ("q", params.keywords.clone()),
            ("kl", params.region.clone()),
            ("p", params.safesearch.as_param().to_string()),
            ("vqd", vqd),
            ("o", "json".to_string()),
            ("s", "0".to_string()),
        ];
        if let Some(timelimit) = params.timelimit {
            query.push(("df", timelimit.as_param().to_string()));
        }

        let response = self
            .client
            .get(DDG_API_URL)
            .query(&query)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let response = Self::check_status(response).await?;
        let payload: serde_json::Value =
            response.json().await.map_err(|e| SearchError::Decode {
                reason: e.to_string(),
            })?;

        parse_api_results(&payload, params.max_results)
    }

    async fn text_html(&self, params: &TextSearchParams) -> Result<Vec<TextResult>, SearchError> {
        let mut form = vec![
            ("q", params.keywords.clone()),
            ("kl", params.region.clone()),
            ("p", params.safesearch.as_param().to_string()),
        ];
        if let Some(timelimit) = params.timelimit {
            form.push(("df", timelimit.as_param().to_string()));
        }

        let response = self
            .client
            .post(DDG_HTML_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let response = Self::check_status(response).await?;
        let html = response.text().await.map_err(|e| self.request_error(e))?;

        Ok(parse_html_results(&html, params.max_results))
    }

    async fn text_lite(&self, params: &TextSearchParams) -> Result<Vec<TextResult>, SearchError> {
        let mut form = vec![
            ("q", params.keywords.clone()),
            ("kl", params.region.clone()),
        ];
        if let Some(timelimit) = params.timelimit {
            form.push(("df", timelimit.as_param().to_string()));
        }

        let response = self
            .client
            .post(DDG_LITE_URL)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let response = Self::check_status(response).await?;
        let html = response.text().await.map_err(|e| self.request_error(e))?;

        Ok(parse_lite_results(&html, params.max_results))
    }

    async fn query_answers(&self, query: &str) -> Result<Vec<AnswerResult>, SearchError> {
        let response = self
            .client
            .get(DDG_ANSWERS_URL)
            .query(&[("q", query), ("format", "json"), ("no_html", "1")])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let response = Self::check_status(response).await?;
        let payload: serde_json::Value =
            response.json().await.map_err(|e| SearchError::Decode {
                reason: e.to_string(),
            })?;

        Ok(parse_answers(&payload))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoClient {
    async fn text_search(
        &self,
        params: &TextSearchParams,
    ) -> Result<Vec<TextResult>, SearchError> {
        debug!(
            "duckduckgo text search via {:?} backend: {}",
            params.backend, params.keywords
        );

        match params.backend {
            Backend::Api => self.text_api(params).await,
            Backend::Html => self.text_html(params).await,
            Backend::Lite => self.text_lite(params).await,
        }
    }

    async fn answers(&self, query: &str) -> Result<Vec<AnswerResult>, SearchError> {
        debug!("duckduckgo answers lookup: {}", query);
        self.query_answers(query).await
    }

    fn name(&self) -> &'static str {
        "duckduckgo"
    }
}

static VQD_RE: OnceLock<Regex> = OnceLock::new();

/// Extract the `vqd` token from the DuckDuckGo landing page
fn extract_vqd(body: &str) -> Option<String> {
    let re = VQD_RE.get_or_init(|| Regex::new(r#"vqd=['"]?([\d-]+)"#).unwrap());
    re.captures(body).map(|captures| captures[1].to_string())
}

/// Parse the JSON rows returned by the `d.js` endpoint
///
/// Rows carry `t` (title), `a` (abstract) and `u` (url); the trailing
/// next-page marker row has an `n` key and no result payload.
fn parse_api_results(
    payload: &serde_json::Value,
    max_results: Option<usize>,
) -> Result<Vec<TextResult>, SearchError> {
    let rows = payload
        .get("results")
        .and_then(|r| r.as_array())
        .ok_or_else(|| SearchError::Decode {
            reason: "results array missing from d.js payload".to_string(),
        })?;

    let mut results = Vec::new();
    for row in rows {
        if let Some(max) = max_results {
            if results.len() >= max {
                break;
            }
        }
        if row.get("n").is_some() {
            continue;
        }

        let href = row.get("u").and_then(|v| v.as_str()).unwrap_or_default();
        let title = row.get("t").and_then(|v| v.as_str()).unwrap_or_default();
        let body = row.get("a").and_then(|v| v.as_str()).unwrap_or_default();

        if href.is_empty() || title.is_empty() {
            continue;
        }

        results.push(TextResult {
            title: html_decode(title),
            body: html_decode(body),
            href: href.to_string(),
        });
    }

    Ok(results)
}

/// Parse the full HTML interface results
fn parse_html_results(html: &str, max_results: Option<usize>) -> Vec<TextResult> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse("div.result").unwrap();
    let title_selector = Selector::parse("a.result__a").unwrap();
    let snippet_selector = Selector::parse(".result__snippet").unwrap();

    let mut results = Vec::new();
    for element in document.select(&result_selector) {
        if let Some(max) = max_results {
            if results.len() >= max {
                break;
            }
        }

        let Some(link) = element.select(&title_selector).next() else {
            continue;
        };
        let title = link.text().collect::<String>().trim().to_string();
        let href = link
            .value()
            .attr("href")
            .map(resolve_redirect_url)
            .unwrap_or_default();

        if title.is_empty() || href.is_empty() {
            continue;
        }

        let body = element
            .select(&snippet_selector)
            .next()
            .map(|snippet| snippet.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        results.push(TextResult { title, body, href });
    }

    results
}

/// Parse the lite interface's table layout
///
/// Result links sit in `a.result-link` cells with the snippet in a
/// following `td.result-snippet` row.
fn parse_lite_results(html: &str, max_results: Option<usize>) -> Vec<TextResult> {
    let document = Html::parse_document(html);
    let link_selector = Selector::parse("a.result-link").unwrap();
    let snippet_selector = Selector::parse("td.result-snippet").unwrap();

    let snippets: Vec<String> = document
        .select(&snippet_selector)
        .map(|snippet| snippet.text().collect::<String>().trim().to_string())
        .collect();

    let mut results = Vec::new();
    for (i, link) in document.select(&link_selector).enumerate() {
        if let Some(max) = max_results {
            if results.len() >= max {
                break;
            }
        }

        let title = link.text().collect::<String>().trim().to_string();
        let href = link
            .value()
            .attr("href")
            .map(resolve_redirect_url)
            .unwrap_or_default();

        if title.is_empty() || href.is_empty() {
            continue;
        }

        let body = snippets.get(i).cloned().unwrap_or_default();
        results.push(TextResult { title, body, href });
    }

    results
}

/// Flatten the instant-answer payload into answer records
///
/// The abstract comes first, followed by related topics in response order
/// (topic groups are walked recursively).
fn parse_answers(payload: &serde_json::Value) -> Vec<AnswerResult> {
    let mut answers = Vec::new();

    let abstract_text = payload
        .get("AbstractText")
        .and_then(|v| v.as_str())
        .unwrap_or_default();
    if !abstract_text.is_empty() {
        answers.push(AnswerResult {
            text: abstract_text.to_string(),
            url: payload
                .get("AbstractURL")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
        });
    }

    if let Some(topics) = payload.get("RelatedTopics").and_then(|v| v.as_array()) {
        for topic in topics {
            collect_topic(topic, &mut answers);
        }
    }

    answers
}

fn collect_topic(topic: &serde_json::Value, answers: &mut Vec<AnswerResult>) {
    if let Some(nested) = topic.get("Topics").and_then(|v| v.as_array()) {
        for inner in nested {
            collect_topic(inner, answers);
        }
        return;
    }

    let text = topic.get("Text").and_then(|v| v.as_str()).unwrap_or_default();
    let url = topic
        .get("FirstURL")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    if !text.is_empty() && !url.is_empty() {
        answers.push(AnswerResult {
            text: text.to_string(),
            url: url.to_string(),
        });
    }
}

/// Resolve DuckDuckGo's redirect links to the target URL
///
/// Result links look like `//duckduckgo.com/l/?uddg=<encoded>&rut=...`;
/// direct links are passed through unchanged.
fn resolve_redirect_url(href: &str) -> String {
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        href.to_string()
    };

    match Url::parse(&absolute) {
        Ok(url) => {
            if url.path().starts_with("/l/") {
                if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
                    return target.into_owned();
                }
            }
            absolute
        }
        Err(_) => String::new(),
    }
}

/// Strip HTML entities and tags from result text
fn html_decode(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .split('<')
        .map(|part| {
            if let Some(pos) = part.find('>') {
                &part[pos + 1..]
            } else {
                part
            }
        })
        .collect::<Vec<_>>()
        .join("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = DuckDuckGoClient::new(None, Duration::from_secs(10)).unwrap();
        assert_eq!(client.name(), "duckduckgo");
    }

    #[test]
    fn test_client_creation_with_proxy() {
        let client = DuckDuckGoClient::new(Some("http://proxy.test:3128"), Duration::from_secs(10));
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_creation_invalid_proxy() {
        let client = DuckDuckGoClient::new(Some("::not a proxy::"), Duration::from_secs(10));
        assert!(matches!(client, Err(SearchError::Client { .. })));
    }

    #[test]
    fn test_extract_vqd() {
        assert_eq!(
            extract_vqd(r#"...;vqd="4-12345678901234567890";..."#).as_deref(),
            Some("4-12345678901234567890")
        );
        assert_eq!(
            extract_vqd("nrj('/d.js?q=test&vqd=4-987654321&kl=wt-wt')").as_deref(),
            Some("4-987654321")
        );
        assert!(extract_vqd("no token here").is_none());
    }

    #[test]
    fn test_parse_api_results() {
        let payload = serde_json::json!({
            "results": [
                {"t": "First &amp; Foremost", "a": "Body <b>one</b>", "u": "https://example.com/1"},
                {"t": "Second", "a": "Body two", "u": "https://example.com/2"},
                {"n": "/d.js?q=test&s=20"}
            ]
        });

        let results = parse_api_results(&payload, None).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "First & Foremost");
        assert_eq!(results[0].body, "Body one");
        assert_eq!(results[1].href, "https://example.com/2");
    }

    #[test]
    fn test_parse_api_results_respects_max() {
        let payload = serde_json::json!({
            "results": [
                {"t": "One", "a": "a", "u": "https://example.com/1"},
                {"t": "Two", "a": "b", "u": "https://example.com/2"},
                {"t": "Three", "a": "c", "u": "https://example.com/3"}
            ]
        });

        let results = parse_api_results(&payload, Some(2)).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_parse_api_results_missing_array() {
        let payload = serde_json::json!({"unexpected": true});
        assert!(matches!(
            parse_api_results(&payload, None),
            Err(SearchError::Decode { .. })
        ));
    }

    #[test]
    fn test_parse_html_results() {
        let html = r#"
            <div class="result">
                <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fone&rut=abc">Example One</a>
                <a class="result__snippet">Snippet one</a>
            </div>
            <div class="result">
                <a class="result__a" href="https://example.com/two">Example Two</a>
                <a class="result__snippet">Snippet two</a>
            </div>
        "#;

        let results = parse_html_results(html, None);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Example One");
        assert_eq!(results[0].href, "https://example.com/one");
        assert_eq!(results[0].body, "Snippet one");
        assert_eq!(results[1].href, "https://example.com/two");
    }

    #[test]
    fn test_parse_html_results_empty() {
        assert!(parse_html_results("", Some(10)).is_empty());
    }

    #[test]
    fn test_parse_lite_results() {
        let html = r#"
            <table>
                <tr><td><a class="result-link" href="https://example.com/a">Result A</a></td></tr>
                <tr><td class="result-snippet">Snippet A</td></tr>
                <tr><td><a class="result-link" href="https://example.com/b">Result B</a></td></tr>
                <tr><td class="result-snippet">Snippet B</td></tr>
            </table>
        "#;

        let results = parse_lite_results(html, None);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Result A");
        assert_eq!(results[0].body, "Snippet A");
        assert_eq!(results[1].href, "https://example.com/b");
    }

    #[test]
    fn test_parse_lite_results_respects_max() {
        let html = r#"
            <a class="result-link" href="https://example.com/a">A</a>
            <a class="result-link" href="https://example.com/b">B</a>
        "#;

        let results = parse_lite_results(html, Some(1));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_resolve_redirect_url() {
        let redirect = "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=abc";
        assert_eq!(resolve_redirect_url(redirect), "https://example.com");

        let direct = "https://example.com";
        assert_eq!(resolve_redirect_url(direct), "https://example.com");

        assert_eq!(resolve_redirect_url("not a url"), "");
    }

    #[test]
    fn test_parse_answers() {
        let payload = serde_json::json!({
            "AbstractText": "Frico is a traditional Friulian dish.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Frico",
            "RelatedTopics": [
                {"Text": "Frico - a cheese dish", "FirstURL": "https://example.com/frico"},
                {"Topics": [
                    {"Text": "Nested topic", "FirstURL": "https://example.com/nested"}
                ]}
            ]
        });

        let answers = parse_answers(&payload);
        assert_eq!(answers.len(), 3);
        assert_eq!(answers[0].text, "Frico is a traditional Friulian dish.");
        assert_eq!(answers[0].url, "https://en.wikipedia.org/wiki/Frico");
        assert_eq!(answers[1].text, "Frico - a cheese dish");
        assert_eq!(answers[2].url, "https://example.com/nested");
    }

    #[test]
    fn test_parse_answers_empty_payload() {
        let payload = serde_json::json!({
            "AbstractText": "",
            "RelatedTopics": []
        });
        assert!(parse_answers(&payload).is_empty());
    }

    #[test]
    fn test_html_decode() {
        assert_eq!(html_decode("Hello &amp; World"), "Hello & World");
        assert_eq!(html_decode("<b>bold</b> text"), "bold text");
        assert_eq!(html_decode("plain text"), "plain text");
    }
}
